use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sales_etl::clean::CleaningPipeline;
use sales_etl::dataset::{Dataset, Value, decode_str};
use sales_etl::warehouse::{
    LoadConfigBuilder, WarehouseLoader, WarehouseRows, WarehouseSchema, connect, customer_rows,
    product_rows, sale_rows,
};
use sea_orm_migration::SchemaManager;
use tempfile::TempDir;

const SALES_COLUMNS: [&str; 9] = [
    "TransactionID",
    "SaleDate",
    "CustomerID",
    "ProductID",
    "StoreID",
    "CampaignID",
    "SaleAmount",
    "DiscountAmount",
    "State",
];

const STATES: [&str; 5] = ["TX", "CA", "OH", "NY", "FL"];

/// Raw sales with roughly 5% duplicates, 5% missing campaigns and 5% bad
/// amounts.
fn raw_sales(rows: usize, seed: u64) -> Dataset {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(rows);

    for i in 0..rows {
        let id = if i > 0 && rng.gen_ratio(1, 20) {
            i as i64 - 1
        } else {
            i as i64
        };
        let campaign = if rng.gen_ratio(1, 20) {
            Value::Null
        } else {
            Value::Int(rng.gen_range(1..=10))
        };
        let amount = match rng.gen_range(0..20) {
            0 => Value::from("n/a"),
            1 => Value::Float(-rng.gen_range(0.0..100.0)),
            _ => Value::Float(rng.gen_range(1.5..5000.0)),
        };

        data.push(vec![
            Value::Int(id),
            Value::from("1/7/24"),
            Value::Int(rng.gen_range(1001..1201)),
            Value::Int(rng.gen_range(101..121)),
            Value::Int(rng.gen_range(401..411)),
            campaign,
            amount,
            Value::Float(rng.gen_range(0.0..25.0)),
            Value::from(STATES[rng.gen_range(0..STATES.len())]),
        ]);
    }

    Dataset::from_rows(SALES_COLUMNS, data).unwrap()
}

fn warehouse_rows(sales: usize) -> WarehouseRows {
    let mut customers = String::from("CustomerID,Name,Region,JoinDate,Age,SubscriptionStatus\n");
    for id in 1001..1201 {
        customers.push_str(&format!("{},Customer {},East,1/1/21,40,Active\n", id, id));
    }
    let mut products = String::from(
        "productid,productname,category,unitprice,manufactureyear,availabilitystatus\n",
    );
    for id in 101..121 {
        products.push_str(&format!("{},item{},Electronics,99.5,2022,In Stock\n", id, id));
    }

    let prepared = CleaningPipeline::default().run(raw_sales(sales, 7)).unwrap();
    WarehouseRows {
        customers: customer_rows(decode_str(&customers).unwrap()).unwrap(),
        products: product_rows(decode_str(&products).unwrap()).unwrap(),
        sales: sale_rows(prepared).unwrap(),
    }
}

fn bench_cleaning_volumes(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaning_volumes");

    for rows in [1_000usize, 10_000, 100_000] {
        let raw = raw_sales(rows, 42);
        let pipeline = CleaningPipeline::default();

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &raw, |b, raw| {
            b.iter_batched(
                || raw.clone(),
                |dataset| pipeline.run(dataset).unwrap(),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_load_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_batch_sizes");
    group.sample_size(10);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("bench.db").display());
    let rows = warehouse_rows(5_000);
    let sales = rows.sales.len();

    for batch_size in [50usize, 250, 500] {
        group.throughput(Throughput::Elements(sales as u64));
        group.bench_with_input(
            BenchmarkId::new("batch_size", batch_size),
            &batch_size,
            |b, &batch_size| {
                b.to_async(&runtime).iter_batched(
                    || rows.clone(),
                    |rows| {
                        let url = url.clone();
                        async move {
                            let db = connect(&url).await.unwrap();
                            WarehouseSchema::reset(&SchemaManager::new(&db)).await.unwrap();
                            let config = LoadConfigBuilder::default()
                                .batch_size(batch_size)
                                .build()
                                .unwrap();
                            WarehouseLoader::new(config).load(&db, rows).await.unwrap();
                            db.close().await.unwrap();
                        }
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_cleaning_volumes, bench_load_batch_sizes);
criterion_main!(benches);
