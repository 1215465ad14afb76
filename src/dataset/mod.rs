pub mod tabular;
pub mod types;

pub use tabular::{CsvSink, CsvSource, MISSING_MARKERS, TabularSink, TabularSource, decode_str};
pub use types::{Dataset, Row, Value};
