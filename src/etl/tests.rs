use super::*;
use crate::clean::CleaningConfigBuilder;
use crate::dataset::{CsvSource, TabularSource, Value};
use crate::warehouse::{self, LoadConfigBuilder, OrphanPolicy, customers, products, sales};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RAW_SALES_CSV: &str = "TransactionID,SaleDate,CustomerID,ProductID,StoreID,CampaignID,SaleAmount,DiscountAmount,State\n\
    550,1/7/24,1001,101,404,1,6344.96,5.5,TX\n\
    550,1/7/24,1001,101,404,1,6344.96,5.5,TX\n\
    551,1/8/24,1002,102,403,,39.1,0,CA\n\
    552,1/9/24,1001,102,402,2,-5,0,OH\n\
    553,1/9/24,1002,101,401,3,abc,0,NY\n\
    554,2/1/24,1002,102,401,3,250,1.25,NY\n";

const CUSTOMERS_CSV: &str = "CustomerID,Name,Region,JoinDate,Age,SubscriptionStatus\n\
    1001,William White,East,11/11/21,33,Active\n\
    1002,Sophia Brown,West,8/19/23,46,Inactive\n";

const PRODUCTS_CSV: &str = "productid,productname,category,unitprice,manufactureyear,availabilitystatus\n\
    101,laptop,Electronics,793.12,2021,In Stock\n\
    102,hoodie,Clothing,39.10,2023,Backorder\n";

const PREPARED_SALES_CSV: &str = "TransactionID,SaleDate,CustomerID,ProductID,StoreID,CampaignID,SaleAmount,DiscountAmount,State\n\
    550,5/4/25,1001,101,404,1,6344.96,5.5,TX\n\
    554,5/4/25,1002,102,401,3,250,1.25,NY\n";

fn config_in(dir: &TempDir) -> PipelineConfig {
    PipelineConfigBuilder::default()
        .raw_dir(dir.path().join("raw"))
        .prepared_dir(dir.path().join("prepared"))
        .warehouse_path(dir.path().join("dw").join("smart_sales.db"))
        .build()
        .unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

fn write_prepared(config: &PipelineConfig, sales_csv: &str) {
    write_file(config.prepared_dir(), "customers_prepared.csv", CUSTOMERS_CSV);
    write_file(config.prepared_dir(), "products_prepared.csv", PRODUCTS_CSV);
    write_file(config.prepared_dir(), "sales_prepared.csv", sales_csv);
}

async fn open(config: &PipelineConfig) -> DatabaseConnection {
    warehouse::connect(&config.database_url()).await.unwrap()
}

async fn counts(config: &PipelineConfig) -> (u64, u64, u64) {
    let db = open(config).await;
    let counts = (
        customers::Entity::find().count(&db).await.unwrap(),
        products::Entity::find().count(&db).await.unwrap(),
        sales::Entity::find().count(&db).await.unwrap(),
    );
    db.close().await.unwrap();
    counts
}

#[test]
fn test_pipeline_config_defaults() {
    let config = PipelineConfig::default();

    assert_eq!(config.raw_dir(), Path::new("data/raw"));
    assert_eq!(config.prepared_dir(), Path::new("data/prepared"));
    assert_eq!(config.warehouse_path(), Path::new("data/dw/smart_sales.db"));
    assert_eq!(config.database_url(), "sqlite://data/dw/smart_sales.db?mode=rwc");
}

#[test]
fn test_pipeline_config_builder_partial_override() {
    let config = PipelineConfigBuilder::default()
        .warehouse_path("/tmp/dw.db")
        .build()
        .unwrap();

    assert_eq!(config.raw_dir(), Path::new("data/raw"));
    assert_eq!(config.database_url(), "sqlite:///tmp/dw.db?mode=rwc");
}

#[test]
fn test_ensure_dirs_creates_layout() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    config.ensure_dirs().unwrap();
    config.ensure_dirs().unwrap();

    assert!(dir.path().join("raw").is_dir());
    assert!(dir.path().join("prepared").is_dir());
    assert!(dir.path().join("dw").is_dir());
    assert!(!config.warehouse_path().exists());
}

#[tokio::test]
async fn test_prepare_cleans_and_writes() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_file(config.raw_dir(), "sales_data.csv", RAW_SALES_CSV);

    let summary = run_prepare(&config).await.unwrap();

    assert_eq!(summary.rows_in, 6);
    assert_eq!(summary.rows_out, 2);
    assert_eq!(summary.columns, 9);
    let removed: Vec<usize> = summary.steps.iter().map(|s| s.removed()).collect();
    assert_eq!(removed, vec![1, 1, 2, 0]);

    let prepared = CsvSource::new(config.prepared_dir())
        .read("sales_prepared.csv")
        .unwrap();
    let ids: Vec<&Value> = prepared.column("TransactionID").unwrap().collect();
    assert_eq!(ids, [&Value::Int(550), &Value::Int(554)]);
    assert!(
        prepared
            .column("SaleDate")
            .unwrap()
            .all(|v| *v == Value::from("5/4/25"))
    );
}

#[tokio::test]
async fn test_prepare_missing_raw_file() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let err = run_prepare(&config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("sales_data.csv"));
    assert!(!config.prepared_dir().join("sales_prepared.csv").exists());
}

#[tokio::test]
async fn test_prepare_with_custom_bound() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_file(config.raw_dir(), "sales_data.csv", RAW_SALES_CSV);

    let cleaning = CleaningConfigBuilder::default()
        .lower_bound(1000.0)
        .build()
        .unwrap();
    let summary = run_prepare_with(&config, &cleaning).await.unwrap();

    assert_eq!(summary.rows_out, 1);
}

#[tokio::test]
async fn test_load_success() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_prepared(&config, PREPARED_SALES_CSV);

    let result = run_load(&config).await;

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(counts(&config).await, (2, 2, 2));

    let db = open(&config).await;
    let sale = sales::Entity::find_by_id(554i64)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sale.sale_date.as_deref(), Some("5/4/25"));
    assert_eq!(sale.sales_amount, Some(250.0));
    assert_eq!(sale.state.as_deref(), Some("NY"));
}

#[tokio::test]
async fn test_prepare_then_load() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_file(config.raw_dir(), "sales_data.csv", RAW_SALES_CSV);
    write_file(config.prepared_dir(), "customers_prepared.csv", CUSTOMERS_CSV);
    write_file(config.prepared_dir(), "products_prepared.csv", PRODUCTS_CSV);

    run_prepare(&config).await.unwrap();
    let result = run_load(&config).await;

    match result {
        LoadResult::Success(summary) => {
            assert_eq!(summary.sales, 2);
            assert_eq!(summary.orphan_sales, 0);
        }
        other => panic!("unexpected load result: {:?}", other),
    }
}

#[tokio::test]
async fn test_load_missing_file_leaves_warehouse_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_prepared(&config, PREPARED_SALES_CSV);
    assert!(run_load(&config).await.is_success());

    fs::remove_file(config.prepared_dir().join("products_prepared.csv")).unwrap();
    let result = run_load(&config).await;

    match result {
        LoadResult::Failure { kind, detail } => {
            assert_eq!(kind, ErrorKind::NotFound);
            assert!(detail.contains("products_prepared.csv"));
        }
        other => panic!("unexpected load result: {:?}", other),
    }
    assert_eq!(counts(&config).await, (2, 2, 2));
}

#[tokio::test]
async fn test_failed_insert_rolls_back_reset() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_prepared(&config, PREPARED_SALES_CSV);
    assert!(run_load(&config).await.is_success());

    let duplicate_sale = format!("{}550,5/4/25,1002,102,401,3,10,0,NY\n", PREPARED_SALES_CSV);
    write_prepared(&config, &duplicate_sale);
    let result = run_load(&config).await;

    assert!(matches!(result, LoadResult::Failure { kind: ErrorKind::Io, .. }));
    assert_eq!(counts(&config).await, (2, 2, 2));
}

#[tokio::test]
async fn test_rejected_orphans_keep_previous_load() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_prepared(&config, PREPARED_SALES_CSV);
    assert!(run_load(&config).await.is_success());

    let orphan = format!("{}555,5/4/25,7777,101,401,3,10,0,NY\n", PREPARED_SALES_CSV);
    write_prepared(&config, &orphan);
    let load = LoadConfigBuilder::default()
        .orphan_policy(OrphanPolicy::Reject)
        .build()
        .unwrap();
    let result = run_load_with(&config, load).await;

    assert!(matches!(
        result,
        LoadResult::Failure {
            kind: ErrorKind::ReferentialIntegrity,
            ..
        }
    ));
    assert_eq!(counts(&config).await, (2, 2, 2));
}

#[tokio::test]
async fn test_reload_replaces_contents() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_prepared(&config, PREPARED_SALES_CSV);
    assert!(run_load(&config).await.is_success());

    let one_sale = "TransactionID,SaleDate,CustomerID,ProductID,StoreID,CampaignID,SaleAmount,DiscountAmount,State\n\
        600,5/4/25,1001,102,404,1,80,0,TX\n";
    write_prepared(&config, one_sale);
    assert!(run_load(&config).await.is_success());

    assert_eq!(counts(&config).await, (2, 2, 1));
    let db = open(&config).await;
    assert!(sales::Entity::find_by_id(550i64).one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_load_schema_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_prepared(&config, "TransactionID,SaleDate\n1,5/4/25\n");

    let result = run_load(&config).await;

    match result {
        LoadResult::Failure { kind, detail } => {
            assert_eq!(kind, ErrorKind::Schema);
            assert!(detail.contains("CustomerID"));
        }
        other => panic!("unexpected load result: {:?}", other),
    }
}
