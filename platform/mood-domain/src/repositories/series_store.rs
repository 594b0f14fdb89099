use crate::errors::PipelineError;
use crate::value_objects::rows::{SeriesRecord, SeriesRow};
use std::path::PathBuf;

/// A stored record projected onto the requested columns, with its 1-based
/// line number in the underlying resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line: u64,
    pub fields: Vec<String>,
}

/// Append-only named tables.
///
/// `append_records` writes the header only when it creates the resource, and
/// must not touch anything when `records` is empty. `read_records` fails with
/// `SchemaMismatch` when a requested column is absent; extra columns are
/// ignored.
pub trait SeriesStore {
    fn location(&self, series: &str) -> PathBuf;

    fn append_records(
        &self,
        series: &str,
        columns: &[&str],
        records: &[Vec<String>],
    ) -> Result<usize, PipelineError>;

    fn read_records(&self, series: &str, columns: &[&str]) -> Result<Vec<RawRecord>, PipelineError>;
}

pub fn append_rows<R: SeriesRow>(
    store: &dyn SeriesStore,
    series: &str,
    rows: &[R],
) -> Result<usize, PipelineError> {
    if rows.is_empty() {
        return Ok(0);
    }
    let records: Vec<Vec<String>> = rows.iter().map(SeriesRow::to_fields).collect();
    store.append_records(series, R::COLUMNS, &records)
}

pub fn load_rows<R: SeriesRecord>(store: &dyn SeriesStore, series: &str) -> Result<Vec<R>, PipelineError> {
    let records = store.read_records(series, R::COLUMNS)?;
    records
        .into_iter()
        .map(|record| {
            R::from_fields(&record.fields).map_err(|reason| PipelineError::InvalidRecord {
                path: store.location(series),
                line: record.line,
                reason,
            })
        })
        .collect()
}
