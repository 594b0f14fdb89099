use crate::services::bucketing::floor_to_hour;
use crate::value_objects::rows::{JoinedRow, PriceRow, SentimentRow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentReport {
    pub price_rows: usize,
    pub sentiment_rows: usize,
    pub joined_rows: usize,
    pub matched_hours: usize,
    pub price_only_hours: usize,
    pub sentiment_only_hours: usize,
}

/// Inner join of the two series on the hour bucket.
///
/// Timestamps on both sides are re-floored first. Every price row is paired
/// with every sentiment row of its hour, so duplicate rows from repeated runs
/// fan out rather than collapse. Output is sorted by hour, then entity; ties
/// keep input order.
pub fn align(prices: &[PriceRow], sentiment: &[SentimentRow]) -> (Vec<JoinedRow>, AlignmentReport) {
    let mut sentiment_by_hour: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
    for row in sentiment {
        sentiment_by_hour
            .entry(floor_to_hour(row.timestamp))
            .or_default()
            .push(row.sentiment);
    }

    let mut price_hours: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    let mut joined = Vec::new();
    for row in prices {
        let hour = floor_to_hour(row.timestamp);
        price_hours.insert(hour);
        let Some(values) = sentiment_by_hour.get(&hour) else {
            continue;
        };
        for value in values {
            joined.push(JoinedRow {
                hour_start: hour,
                entity: row.entity.clone(),
                price_usd: row.price_usd,
                sentiment: *value,
            });
        }
    }
    joined.sort_by(|a, b| {
        a.hour_start
            .cmp(&b.hour_start)
            .then_with(|| a.entity.cmp(&b.entity))
    });

    let matched_hours = price_hours
        .iter()
        .filter(|hour| sentiment_by_hour.contains_key(hour))
        .count();
    let report = AlignmentReport {
        price_rows: prices.len(),
        sentiment_rows: sentiment.len(),
        joined_rows: joined.len(),
        matched_hours,
        price_only_hours: price_hours.len() - matched_hours,
        sentiment_only_hours: sentiment_by_hour.len() - matched_hours,
    };
    (joined, report)
}
