use crate::config::Config;
use mood_domain::errors::PipelineError;
use mood_domain::repositories::dataset::DatasetWriter;
use mood_domain::repositories::series_store::{load_rows, SeriesStore};
use mood_domain::services::alignment::{align, AlignmentReport};
use mood_domain::value_objects::rows::{PriceRow, SentimentRow};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub path: PathBuf,
    pub sha256: String,
    #[serde(flatten)]
    pub report: AlignmentReport,
}

/// Rebuilds the joined dataset from both persisted series. The output is
/// replaced wholesale on every run, including when the join is empty.
pub fn run_merge(
    config: &Config,
    store: &dyn SeriesStore,
    writer: &dyn DatasetWriter,
) -> Result<MergeSummary, PipelineError> {
    let _span = info_span!(
        "merge",
        prices = %config.paths.price_series,
        sentiment = %config.paths.sentiment_series
    )
    .entered();
    let stage_start = Instant::now();

    let prices: Vec<PriceRow> = load_rows(store, &config.paths.price_series)?;
    let sentiment: Vec<SentimentRow> = load_rows(store, &config.paths.sentiment_series)?;
    metrics::histogram!("mood.merge.load_ms").record(stage_start.elapsed().as_millis() as f64);

    let (joined, report) = align(&prices, &sentiment);
    if joined.is_empty() {
        tracing::warn!(
            price_rows = report.price_rows,
            sentiment_rows = report.sentiment_rows,
            "no overlapping hours; writing header-only dataset"
        );
    }

    let receipt = writer.replace(&joined)?;
    metrics::counter!("mood.merge.rows_written").increment(receipt.rows as u64);
    metrics::histogram!("mood.merge.duration_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    tracing::info!(
        rows = receipt.rows,
        matched_hours = report.matched_hours,
        price_only_hours = report.price_only_hours,
        sentiment_only_hours = report.sentiment_only_hours,
        "joined dataset rebuilt"
    );
    Ok(MergeSummary {
        path: receipt.path,
        sha256: receipt.sha256,
        report,
    })
}
