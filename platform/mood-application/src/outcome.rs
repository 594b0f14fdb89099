use serde::Serialize;
use std::path::PathBuf;

/// Terminal state of an ingest run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    Appended {
        series: String,
        path: PathBuf,
        rows: usize,
    },
    /// Nothing qualified; no resource was created or modified.
    NothingToDo { reason: String },
}

impl IngestOutcome {
    pub fn rows_appended(&self) -> usize {
        match self {
            Self::Appended { rows, .. } => *rows,
            Self::NothingToDo { .. } => 0,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NothingToDo { .. })
    }
}
