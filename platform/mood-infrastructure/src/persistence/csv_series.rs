use mood_domain::errors::PipelineError;
use mood_domain::repositories::series_store::{RawRecord, SeriesStore};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One CSV file per series under `dir`, named `<series>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSeriesStore {
    dir: PathBuf,
}

impl CsvSeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn read_header(path: &Path) -> Result<Option<Vec<String>>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| PipelineError::unwritable(path, format!("failed to open: {err}")))?;
    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|err| PipelineError::unwritable(path, format!("failed to read header: {err}")))?;
    if !found {
        return Ok(None);
    }
    Ok(Some(record.iter().map(|field| field.trim().to_string()).collect()))
}

fn ends_with_newline(path: &Path) -> Result<bool, PipelineError> {
    let mut file =
        File::open(path).map_err(|err| PipelineError::unwritable(path, format!("failed to open: {err}")))?;
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(|err| PipelineError::unwritable(path, format!("failed to read last byte: {err}")))?;
    Ok(last[0] == b'\n')
}

fn check_append_header(path: &Path, existing: &[String], columns: &[&str]) -> Result<(), PipelineError> {
    if let Some(missing) = columns
        .iter()
        .find(|column| !existing.iter().any(|field| field == *column))
    {
        return Err(PipelineError::SchemaMismatch {
            path: path.to_path_buf(),
            missing: (*missing).to_string(),
        });
    }
    if existing.len() != columns.len() || existing.iter().zip(columns).any(|(a, b)| a != b) {
        return Err(PipelineError::unwritable(
            path,
            format!(
                "existing header [{}] does not match [{}]",
                existing.join(","),
                columns.join(",")
            ),
        ));
    }
    Ok(())
}

impl SeriesStore for CsvSeriesStore {
    fn location(&self, series: &str) -> PathBuf {
        self.dir.join(format!("{series}.csv"))
    }

    fn append_records(
        &self,
        series: &str,
        columns: &[&str],
        records: &[Vec<String>],
    ) -> Result<usize, PipelineError> {
        let path = self.location(series);
        if records.is_empty() {
            return Ok(0);
        }
        if !self.dir.is_dir() {
            return Err(PipelineError::unwritable(
                &path,
                format!("directory {} does not exist", self.dir.display()),
            ));
        }

        let (write_header, terminate_last_line) = match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => match read_header(&path)? {
                Some(existing) => {
                    check_append_header(&path, &existing, columns)?;
                    (false, !ends_with_newline(&path)?)
                }
                None => (true, !ends_with_newline(&path)?),
            },
            _ => (true, false),
        };

        let mut buf = Vec::new();
        if terminate_last_line {
            buf.push(b'\n');
        }
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(buf);
        if write_header {
            wtr.write_record(columns)
                .map_err(|err| PipelineError::unwritable(&path, format!("failed to encode header: {err}")))?;
        }
        for record in records {
            if record.len() != columns.len() {
                return Err(PipelineError::unwritable(
                    &path,
                    format!("record has {} fields, expected {}", record.len(), columns.len()),
                ));
            }
            wtr.write_record(record)
                .map_err(|err| PipelineError::unwritable(&path, format!("failed to encode row: {err}")))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|err| PipelineError::unwritable(&path, format!("failed to encode rows: {err}")))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| PipelineError::unwritable(&path, format!("failed to open: {err}")))?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|err| PipelineError::unwritable(&path, format!("failed to append: {err}")))?;

        tracing::debug!(path = %path.display(), rows = records.len(), header = write_header, "appended series rows");
        Ok(records.len())
    }

    fn read_records(&self, series: &str, columns: &[&str]) -> Result<Vec<RawRecord>, PipelineError> {
        let path = self.location(series);
        let file = File::open(&path).map_err(|err| PipelineError::unreadable(&path, err))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|err| PipelineError::unreadable(&path, format!("failed to read header: {err}")))?
            .clone();
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            let index = headers
                .iter()
                .position(|field| field.trim() == *column)
                .ok_or_else(|| PipelineError::SchemaMismatch {
                    path: path.clone(),
                    missing: (*column).to_string(),
                })?;
            indices.push(index);
        }

        let mut out = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let fallback_line = idx as u64 + 2;
            let record = result.map_err(|err| PipelineError::InvalidRecord {
                path: path.clone(),
                line: err.position().map(|pos| pos.line()).unwrap_or(fallback_line),
                reason: err.to_string(),
            })?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(fallback_line);
            let mut fields = Vec::with_capacity(indices.len());
            for (column, index) in columns.iter().zip(&indices) {
                let value = record.get(*index).ok_or_else(|| PipelineError::InvalidRecord {
                    path: path.clone(),
                    line,
                    reason: format!("missing value for column '{column}'"),
                })?;
                fields.push(value.trim().to_string());
            }
            out.push(RawRecord { line, fields });
        }
        Ok(out)
    }
}
