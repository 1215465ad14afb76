use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use super::types::{Dataset, Row, Value};
use crate::etl::ETLError;

/// Cell spellings decoded as missing values.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Reads a named dataset.
pub trait TabularSource {
    fn read(&self, name: &str) -> Result<Dataset, ETLError>;
}

/// Writes a dataset under a name, replacing any previous contents.
pub trait TabularSink {
    fn write(&self, dataset: &Dataset, name: &str) -> Result<(), ETLError>;
}

/// CSV files inside one directory.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvSource { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl TabularSource for CsvSource {
    fn read(&self, name: &str) -> Result<Dataset, ETLError> {
        let path = self.path(name);
        info!(path = %path.display(), "reading dataset");
        if !path.is_file() {
            return Err(ETLError::NotFound(path));
        }

        let reader = ReaderBuilder::new().trim(Trim::All).from_path(&path)?;
        let dataset = decode(reader)?;
        info!(
            rows = dataset.len(),
            columns = dataset.column_count(),
            "loaded {}",
            name
        );
        Ok(dataset)
    }
}

#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvSink { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl TabularSink for CsvSink {
    fn write(&self, dataset: &Dataset, name: &str) -> Result<(), ETLError> {
        let path = self.path(name);
        let tmp = self.dir.join(format!(".{}.tmp", name));

        if let Err(e) = write_csv(dataset, &tmp).and_then(|_| Ok(fs::rename(&tmp, &path)?)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    debug!(path = %tmp.display(), "failed to remove temp file: {}", cleanup);
                }
            }
            return Err(e);
        }

        info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.column_count(),
            "dataset saved"
        );
        Ok(())
    }
}

fn write_csv(dataset: &Dataset, path: &Path) -> Result<(), ETLError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Int;
    for cell in cells {
        if kind == ColumnKind::Int && cell.parse::<i64>().is_ok() {
            continue;
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => kind = ColumnKind::Float,
            _ => return ColumnKind::Text,
        }
    }
    kind
}

fn convert(cell: String, kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Int => match cell.parse() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Text(cell),
        },
        ColumnKind::Float => match cell.parse() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Text(cell),
        },
        ColumnKind::Text => Value::Text(cell),
    }
}

/// Decodes CSV records into a dataset, inferring one type per column.
pub fn decode<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset, ETLError> {
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(ETLError::Parse("missing header row".to_string()));
    }

    let mut raw: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw.push(
            record
                .iter()
                .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
                .collect(),
        );
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|c| infer_kind(raw.iter().filter_map(|r| r[c].as_deref())))
        .collect();

    let rows: Vec<Row> = raw
        .into_iter()
        .map(|cells| {
            cells
                .into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| cell.map_or(Value::Null, |c| convert(c, *kind)))
                .collect()
        })
        .collect();

    Dataset::from_rows(columns, rows)
}

/// Decodes CSV text held in memory.
pub fn decode_str(content: &str) -> Result<Dataset, ETLError> {
    decode(
        ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(content.as_bytes()),
    )
}
