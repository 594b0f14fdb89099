use crate::errors::PipelineError;
use crate::value_objects::rows::JoinedRow;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReceipt {
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

/// Destination of the joined view. Each write fully replaces the previous
/// contents; a failed write must leave them untouched.
pub trait DatasetWriter {
    fn replace(&self, rows: &[JoinedRow]) -> Result<DatasetReceipt, PipelineError>;
}
