use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run. Running out of qualifying data is not one of
/// them; use cases report that as a distinct outcome.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source unavailable ({source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("cannot write {}: {reason}", path.display())]
    StorageUnwritable { path: PathBuf, reason: String },

    #[error("cannot read {}: {reason}", path.display())]
    StorageUnreadable { path: PathBuf, reason: String },

    #[error("schema mismatch in {}: missing column '{missing}'", path.display())]
    SchemaMismatch { path: PathBuf, missing: String },

    #[error("invalid record in {} at line {line}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub fn source_unavailable(source_name: &str, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unwritable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageUnwritable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-friendly label, used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::StorageUnwritable { .. } => "storage_unwritable",
            Self::StorageUnreadable { .. } => "storage_unreadable",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}
