use crate::repositories::scorer::SentimentScorer;
use crate::value_objects::bucket_key::BucketKey;
use crate::value_objects::observation::{CommentRecord, PolarityScore, ScoredObservation};
use crate::value_objects::rows::AggregatedRow;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Noise filter applied before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CommentFilter {
    pub min_chars: usize,
    pub min_score: i64,
}

impl Default for CommentFilter {
    fn default() -> Self {
        Self {
            min_chars: 20,
            min_score: 1,
        }
    }
}

/// Why the noise filter dropped a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRejection {
    TooShort,
    LowScore,
}

/// Why the aggregator did not score a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutsideWindow,
    Filtered(FilterRejection),
}

impl CommentFilter {
    pub fn check(&self, comment: &CommentRecord) -> Result<(), FilterRejection> {
        if comment.text.chars().count() < self.min_chars {
            return Err(FilterRejection::TooShort);
        }
        if comment.score < self.min_score {
            return Err(FilterRejection::LowScore);
        }
        Ok(())
    }
}

/// Inclusive `[start, end]` interval of eligible comment times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ObservationWindow {
    /// `[now - minutes, now]`. A span reaching past the earliest
    /// representable instant starts at `DateTime::<Utc>::MIN_UTC`.
    pub fn trailing(now: DateTime<Utc>, minutes: i64) -> Self {
        let start = TimeDelta::try_minutes(minutes.max(0))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentReport {
    pub seen: usize,
    pub outside_window: usize,
    pub too_short: usize,
    pub low_score: usize,
    pub scored: usize,
    pub buckets: usize,
}

impl SentimentReport {
    pub fn filtered(&self) -> usize {
        self.outside_window + self.too_short + self.low_score
    }
}

/// Scores qualifying comments one at a time and reduces them to hourly means.
///
/// Every comment is checked against the window on its own; the feed's
/// newest-first order is never used to stop early.
pub struct SentimentAggregator<'a> {
    entity: String,
    window: ObservationWindow,
    filter: CommentFilter,
    scorer: &'a dyn SentimentScorer,
    scored: Vec<ScoredObservation>,
    report: SentimentReport,
}

impl<'a> SentimentAggregator<'a> {
    pub fn new(
        entity: impl Into<String>,
        window: ObservationWindow,
        filter: CommentFilter,
        scorer: &'a dyn SentimentScorer,
    ) -> Self {
        Self {
            entity: entity.into(),
            window,
            filter,
            scorer,
            scored: Vec::new(),
            report: SentimentReport::default(),
        }
    }

    pub fn report(&self) -> &SentimentReport {
        &self.report
    }

    pub fn ingest(&mut self, comment: &CommentRecord) -> Result<PolarityScore, Rejection> {
        self.report.seen += 1;

        if !self.window.contains(comment.created_at) {
            self.report.outside_window += 1;
            return Err(Rejection::OutsideWindow);
        }
        if let Err(rejection) = self.filter.check(comment) {
            match rejection {
                FilterRejection::TooShort => self.report.too_short += 1,
                FilterRejection::LowScore => self.report.low_score += 1,
            }
            return Err(Rejection::Filtered(rejection));
        }

        let score = PolarityScore::saturating(self.scorer.polarity(&comment.text));
        self.report.scored += 1;
        self.scored.push(ScoredObservation {
            observed_at: comment.created_at,
            entity: self.entity.clone(),
            score,
        });
        Ok(score)
    }

    /// Empty output means nothing qualified; callers must not persist.
    pub fn finish(mut self) -> (Vec<AggregatedRow>, SentimentReport) {
        let rows = mean_by_bucket(&self.scored);
        self.report.buckets = rows.len();
        (rows, self.report)
    }
}

/// Unweighted arithmetic mean per `(hour, entity)`, ordered by key.
///
/// Scores are summed in sorted order so the result does not depend on input
/// order.
pub fn mean_by_bucket(observations: &[ScoredObservation]) -> Vec<AggregatedRow> {
    let mut groups: BTreeMap<BucketKey, Vec<f64>> = BTreeMap::new();
    for obs in observations {
        groups
            .entry(BucketKey::new(obs.observed_at, obs.entity.clone()))
            .or_default()
            .push(obs.score.value());
    }

    groups
        .into_iter()
        .map(|(key, mut scores)| {
            scores.sort_by(|a, b| a.total_cmp(b));
            let sum: f64 = scores.iter().sum();
            AggregatedRow {
                hour_start: key.hour_start(),
                entity: key.entity().to_string(),
                value: sum / scores.len() as f64,
                samples: scores.len(),
            }
        })
        .collect()
}
