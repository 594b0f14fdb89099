use crate::config::Config;
use crate::outcome::IngestOutcome;
use chrono::{DateTime, Utc};
use mood_domain::errors::PipelineError;
use mood_domain::repositories::comment_source::{CommentQuery, CommentSource};
use mood_domain::repositories::scorer::SentimentScorer;
use mood_domain::repositories::series_store::{append_rows, SeriesStore};
use mood_domain::services::sentiment::{ObservationWindow, SentimentAggregator, SentimentReport};
use mood_domain::value_objects::rows::SentimentRow;
use serde::Serialize;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentRun {
    #[serde(flatten)]
    pub outcome: IngestOutcome,
    pub report: SentimentReport,
}

/// Samples the comment feed, keeps comments inside the trailing window that
/// pass the noise filter, and appends one hourly mean per bucket.
///
/// The whole stream is drained before anything is written, so a source
/// failure part way through leaves the series untouched.
pub fn ingest_sentiment(
    config: &Config,
    source: &dyn CommentSource,
    scorer: &dyn SentimentScorer,
    store: &dyn SeriesStore,
    now: DateTime<Utc>,
) -> Result<SentimentRun, PipelineError> {
    let _span = info_span!(
        "ingest_sentiment",
        feed = %config.comments.subreddit,
        limit = config.comments.limit,
        window_minutes = config.comments.window_minutes
    )
    .entered();
    let stage_start = Instant::now();

    let window = ObservationWindow::trailing(now, config.comments.window_minutes);
    let mut aggregator = SentimentAggregator::new(
        config.comments.stream_tag.trim().to_uppercase(),
        window,
        config.filter,
        scorer,
    );

    let stream = source.comments(&CommentQuery {
        feed: config.comments.subreddit.clone(),
        limit: config.comments.limit,
    })?;
    for item in stream {
        let comment = item?;
        if let Err(rejection) = aggregator.ingest(&comment) {
            tracing::trace!(?rejection, created_at = %comment.created_at, "comment skipped");
        }
    }

    let (rows, report) = aggregator.finish();
    metrics::counter!("mood.sentiment.comments_seen").increment(report.seen as u64);
    metrics::counter!("mood.sentiment.comments_filtered").increment(report.filtered() as u64);
    tracing::info!(
        seen = report.seen,
        outside_window = report.outside_window,
        too_short = report.too_short,
        low_score = report.low_score,
        scored = report.scored,
        "comments sampled"
    );

    if rows.is_empty() {
        metrics::histogram!("mood.sentiment.duration_ms")
            .record(stage_start.elapsed().as_millis() as f64);
        let reason = format!(
            "no qualifying comments ({} seen, {} filtered)",
            report.seen,
            report.filtered()
        );
        return Ok(SentimentRun {
            outcome: IngestOutcome::NothingToDo { reason },
            report,
        });
    }

    let sentiment_rows: Vec<SentimentRow> = rows.iter().map(|row| row.to_sentiment_row()).collect();
    let appended = append_rows(store, &config.paths.sentiment_series, &sentiment_rows)?;
    metrics::counter!("mood.sentiment.rows_appended").increment(appended as u64);
    metrics::histogram!("mood.sentiment.duration_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let path = store.location(&config.paths.sentiment_series);
    tracing::info!(rows = appended, path = %path.display(), "sentiment buckets appended");
    Ok(SentimentRun {
        outcome: IngestOutcome::Appended {
            series: config.paths.sentiment_series.clone(),
            path,
            rows: appended,
        },
        report,
    })
}
