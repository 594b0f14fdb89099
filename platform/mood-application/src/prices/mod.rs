use crate::config::Config;
use crate::outcome::IngestOutcome;
use chrono::{DateTime, Utc};
use mood_domain::errors::PipelineError;
use mood_domain::repositories::price_source::PriceSource;
use mood_domain::repositories::series_store::{append_rows, SeriesStore};
use mood_domain::services::prices::price_rows;
use std::time::Instant;
use tracing::info_span;

/// Fetches one quote per tracked asset and appends one row each to the price
/// series. A failed fetch writes nothing.
pub fn ingest_prices(
    config: &Config,
    source: &dyn PriceSource,
    store: &dyn SeriesStore,
    now: DateTime<Utc>,
) -> Result<IngestOutcome, PipelineError> {
    let _span = info_span!(
        "ingest_prices",
        assets = config.prices.assets.len(),
        series = %config.paths.price_series
    )
    .entered();
    let stage_start = Instant::now();

    let ids: Vec<String> = config
        .prices
        .assets
        .iter()
        .map(|asset| asset.id.clone())
        .collect();
    let quotes = source.fetch_prices(&ids)?;
    metrics::histogram!("mood.prices.fetch_ms").record(stage_start.elapsed().as_millis() as f64);

    let rows = price_rows(&config.prices.assets, &quotes, now)
        .map_err(|reason| PipelineError::source_unavailable("prices", reason))?;
    if rows.is_empty() {
        return Ok(IngestOutcome::NothingToDo {
            reason: "no tracked assets to price".to_string(),
        });
    }

    let appended = append_rows(store, &config.paths.price_series, &rows)?;
    metrics::counter!("mood.prices.rows_appended").increment(appended as u64);
    metrics::histogram!("mood.prices.duration_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let path = store.location(&config.paths.price_series);
    tracing::info!(rows = appended, path = %path.display(), "price snapshot appended");
    Ok(IngestOutcome::Appended {
        series: config.paths.price_series.clone(),
        path,
        rows: appended,
    })
}
