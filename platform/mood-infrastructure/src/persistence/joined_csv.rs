use mood_domain::errors::PipelineError;
use mood_domain::repositories::dataset::{DatasetReceipt, DatasetWriter};
use mood_domain::value_objects::rows::{JoinedRow, SeriesRow};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the joined dataset to a single CSV file, replacing it atomically
/// through a sibling temp file.
#[derive(Debug, Clone)]
pub struct CsvDatasetWriter {
    path: PathBuf,
}

impl CsvDatasetWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }
}

pub fn encode_joined(rows: &[JoinedRow]) -> Result<Vec<u8>, String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(JoinedRow::COLUMNS)
        .map_err(|err| format!("failed to write joined header: {}", err))?;
    for row in rows {
        wtr.write_record(row.to_fields())
            .map_err(|err| format!("failed to write joined row: {}", err))?;
    }
    wtr.into_inner()
        .map_err(|err| format!("failed to flush joined csv: {}", err))
}

fn to_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

impl DatasetWriter for CsvDatasetWriter {
    fn replace(&self, rows: &[JoinedRow]) -> Result<DatasetReceipt, PipelineError> {
        let bytes = encode_joined(rows).map_err(|reason| PipelineError::unwritable(&self.path, reason))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                PipelineError::unwritable(parent, format!("failed to create directory: {err}"))
            })?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, &bytes)
            .map_err(|err| PipelineError::unwritable(&tmp, format!("failed to write: {err}")))?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            fs::remove_file(&tmp).ok();
            return Err(PipelineError::unwritable(
                &self.path,
                format!("failed to replace: {err}"),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let sha256 = to_hex(&hasher.finalize()[..]);
        tracing::info!(path = %self.path.display(), rows = rows.len(), %sha256, "joined dataset written");

        Ok(DatasetReceipt {
            path: self.path.clone(),
            rows: rows.len(),
            sha256,
        })
    }
}
