//! Source-to-warehouse column maps and row conversion.
//!
//! Prepared files keep the column spelling of their upstream systems; each
//! entity has a fixed map from those names to warehouse columns. Projection
//! renames, reorders and drops every column the map does not name.

use super::entities::{customers, products, sales};
use crate::dataset::{Dataset, Row, Value};
use crate::etl::ETLError;

/// One source → warehouse column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: &'static str,
    pub target: &'static str,
    /// Optional sources may be absent; the target is then all nulls.
    pub required: bool,
}

const fn required(source: &'static str, target: &'static str) -> ColumnMapping {
    ColumnMapping {
        source,
        target,
        required: true,
    }
}

const fn optional(source: &'static str, target: &'static str) -> ColumnMapping {
    ColumnMapping {
        source,
        target,
        required: false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub table: &'static str,
    pub columns: &'static [ColumnMapping],
}

pub const CUSTOMER_COLUMNS: ColumnMap = ColumnMap {
    table: "customers",
    columns: &[
        required("CustomerID", "customer_id"),
        required("Name", "name"),
        required("Region", "region"),
        required("JoinDate", "join_date"),
        required("Age", "age"),
        required("SubscriptionStatus", "subscription_status"),
    ],
};

pub const PRODUCT_COLUMNS: ColumnMap = ColumnMap {
    table: "products",
    columns: &[
        required("productid", "product_id"),
        required("productname", "product_name"),
        required("category", "category"),
        required("unitprice", "unit_price"),
        required("manufactureyear", "manufacture_year"),
        required("availabilitystatus", "availability_status"),
    ],
};

pub const SALE_COLUMNS: ColumnMap = ColumnMap {
    table: "sales",
    columns: &[
        required("TransactionID", "sale_id"),
        required("SaleDate", "sale_date"),
        required("CustomerID", "customer_id"),
        required("ProductID", "product_id"),
        required("StoreID", "store_id"),
        required("CampaignID", "campaign_id"),
        optional("Quantity", "quantity"),
        required("SaleAmount", "sales_amount"),
        required("DiscountAmount", "discount_amount"),
        required("State", "state"),
    ],
};

impl ColumnMap {
    pub fn targets(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.target)
    }

    /// Renames and projects `dataset` onto this map's warehouse columns.
    pub fn project(&self, dataset: Dataset) -> Result<Dataset, ETLError> {
        let sources: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|mapping| match dataset.column_index(mapping.source) {
                Ok(idx) => Ok(Some(idx)),
                Err(_) if !mapping.required => Ok(None),
                Err(_) => Err(ETLError::Schema(format!(
                    "{}: source column '{}' not found",
                    self.table, mapping.source
                ))),
            })
            .collect::<Result<_, _>>()?;

        let (_, rows) = dataset.into_parts();
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|idx| idx.map_or(Value::Null, |i| row[i].clone()))
                    .collect()
            })
            .collect();

        Dataset::from_rows(self.targets(), rows)
    }
}

/// Typed access to one projected row, with errors naming table, row and
/// column.
struct RowReader<'a> {
    table: &'static str,
    columns: &'a [String],
    row: &'a [Value],
    line: usize,
}

impl<'a> RowReader<'a> {
    fn value(&self, column: &str) -> Result<&'a Value, ETLError> {
        let row = self.row;
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &row[idx])
            .ok_or_else(|| {
                ETLError::Schema(format!("{}: column '{}' not projected", self.table, column))
            })
    }

    fn invalid(&self, column: &str, value: &Value, expected: &str) -> ETLError {
        ETLError::Parse(format!(
            "{} row {}: column '{}' value '{}' is not {}",
            self.table, self.line, column, value, expected
        ))
    }

    fn text(&self, column: &str) -> Result<Option<String>, ETLError> {
        Ok(match self.value(column)? {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
    }

    fn key(&self, column: &str) -> Result<String, ETLError> {
        self.text(column)?.ok_or_else(|| {
            ETLError::Parse(format!(
                "{} row {}: primary key '{}' is empty",
                self.table, self.line, column
            ))
        })
    }

    fn int(&self, column: &str) -> Result<Option<i64>, ETLError> {
        let value = self.value(column)?;
        match value {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            _ => match value.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(self.invalid(column, value, "an integer")),
            },
        }
    }

    fn small_int(&self, column: &str) -> Result<Option<i32>, ETLError> {
        self.int(column)?
            .map(|i| {
                i32::try_from(i)
                    .map_err(|_| self.invalid(column, &Value::Int(i), "a 32-bit integer"))
            })
            .transpose()
    }

    fn real(&self, column: &str) -> Result<Option<f64>, ETLError> {
        let value = self.value(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_f64()
            .map(Some)
            .ok_or_else(|| self.invalid(column, value, "a number"))
    }
}

fn read_rows<T, F>(map: &ColumnMap, dataset: Dataset, mut convert: F) -> Result<Vec<T>, ETLError>
where
    F: FnMut(&RowReader<'_>) -> Result<T, ETLError>,
{
    let projected = map.project(dataset)?;
    projected
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            convert(&RowReader {
                table: map.table,
                columns: projected.columns(),
                row,
                line: i + 1,
            })
        })
        .collect()
}

pub fn customer_rows(dataset: Dataset) -> Result<Vec<customers::Model>, ETLError> {
    read_rows(&CUSTOMER_COLUMNS, dataset, |r| {
        Ok(customers::Model {
            customer_id: r.key("customer_id")?,
            name: r.text("name")?,
            region: r.text("region")?,
            join_date: r.text("join_date")?,
            age: r.small_int("age")?,
            subscription_status: r.text("subscription_status")?,
        })
    })
}

pub fn product_rows(dataset: Dataset) -> Result<Vec<products::Model>, ETLError> {
    read_rows(&PRODUCT_COLUMNS, dataset, |r| {
        Ok(products::Model {
            product_id: r.key("product_id")?,
            product_name: r.text("product_name")?,
            category: r.text("category")?,
            unit_price: r.real("unit_price")?,
            manufacture_year: r.small_int("manufacture_year")?,
            availability_status: r.text("availability_status")?,
        })
    })
}

pub fn sale_rows(dataset: Dataset) -> Result<Vec<sales::Model>, ETLError> {
    read_rows(&SALE_COLUMNS, dataset, |r| {
        let sale_id = r.int("sale_id")?.ok_or_else(|| {
            ETLError::Parse(format!("sales row {}: primary key 'sale_id' is empty", r.line))
        })?;
        Ok(sales::Model {
            sale_id,
            sale_date: r.text("sale_date")?,
            customer_id: r.text("customer_id")?,
            product_id: r.text("product_id")?,
            store_id: r.text("store_id")?,
            campaign_id: r.text("campaign_id")?,
            quantity: r.small_int("quantity")?,
            sales_amount: r.real("sales_amount")?,
            discount_amount: r.real("discount_amount")?,
            state: r.text("state")?,
        })
    })
}
