use crate::value_objects::timestamp::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A row type with a fixed tabular schema. Fields are encoded in `COLUMNS`
/// order.
pub trait SeriesRow {
    const COLUMNS: &'static [&'static str];

    fn to_fields(&self) -> Vec<String>;
}

/// A row that can be decoded back from stored fields in `COLUMNS` order.
pub trait SeriesRecord: SeriesRow + Sized {
    fn from_fields(fields: &[String]) -> Result<Self, String>;
}

pub const TIMESTAMP_COLUMN: &str = "timestamp_utc";

/// One fetched price. `timestamp` is the run time floored to the minute; the
/// hour bucket is only derived at join time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub timestamp: DateTime<Utc>,
    pub entity: String,
    pub price_usd: f64,
}

/// Hourly mean polarity of the sentiment stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRow {
    pub timestamp: DateTime<Utc>,
    pub sentiment: f64,
}

/// Output of the hourly aggregator: one row per bucket key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub hour_start: DateTime<Utc>,
    pub entity: String,
    pub value: f64,
    pub samples: usize,
}

impl AggregatedRow {
    pub fn to_sentiment_row(&self) -> SentimentRow {
        SentimentRow {
            timestamp: self.hour_start,
            sentiment: self.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRow {
    pub hour_start: DateTime<Utc>,
    pub entity: String,
    pub price_usd: f64,
    pub sentiment: f64,
}

fn field<'a>(fields: &'a [String], idx: usize, name: &str) -> Result<&'a str, String> {
    fields
        .get(idx)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("missing {name} value"))
}

fn parse_number(raw: &str, name: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid {name} '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite {name} '{raw}'"));
    }
    Ok(value)
}

fn parse_entity(raw: &str) -> Result<String, String> {
    let entity = raw.trim();
    if entity.is_empty() {
        return Err("empty entity".to_string());
    }
    Ok(entity.to_uppercase())
}

impl SeriesRow for PriceRow {
    const COLUMNS: &'static [&'static str] = &[TIMESTAMP_COLUMN, "entity", "price_usd"];

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_timestamp(self.timestamp),
            self.entity.clone(),
            self.price_usd.to_string(),
        ]
    }

}

impl SeriesRecord for PriceRow {
    fn from_fields(fields: &[String]) -> Result<Self, String> {
        Ok(Self {
            timestamp: parse_timestamp(field(fields, 0, TIMESTAMP_COLUMN)?)?,
            entity: parse_entity(field(fields, 1, "entity")?)?,
            price_usd: parse_number(field(fields, 2, "price_usd")?, "price_usd")?,
        })
    }
}

impl SeriesRow for SentimentRow {
    const COLUMNS: &'static [&'static str] = &[TIMESTAMP_COLUMN, "sentiment"];

    fn to_fields(&self) -> Vec<String> {
        vec![format_timestamp(self.timestamp), self.sentiment.to_string()]
    }

}

impl SeriesRecord for SentimentRow {
    fn from_fields(fields: &[String]) -> Result<Self, String> {
        let raw = field(fields, 1, "sentiment")?;
        let sentiment = parse_number(raw, "sentiment")?;
        if !(-1.0..=1.0).contains(&sentiment) {
            return Err(format!("sentiment '{raw}' out of range [-1, 1]"));
        }
        Ok(Self {
            timestamp: parse_timestamp(field(fields, 0, TIMESTAMP_COLUMN)?)?,
            sentiment,
        })
    }
}

impl SeriesRow for JoinedRow {
    const COLUMNS: &'static [&'static str] =
        &[TIMESTAMP_COLUMN, "entity", "price_usd", "sentiment"];

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_timestamp(self.hour_start),
            self.entity.clone(),
            self.price_usd.to_string(),
            self.sentiment.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{PriceRow, SentimentRow, SeriesRecord, SeriesRow};
    use chrono::{TimeZone, Utc};

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn price_row_encodes_minute_timestamp_and_plain_number() {
        let row = PriceRow {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 6, 17, 5, 0).unwrap(),
            entity: "BTC".to_string(),
            price_usd: 68510.0,
        };
        assert_eq!(
            row.to_fields(),
            fields(&["2025-06-06T17:05:00+00:00", "BTC", "68510"])
        );
    }

    #[test]
    fn price_row_uppercases_entity_on_read() {
        let row = PriceRow::from_fields(&fields(&["2025-06-06T17:05:00+00:00", "btc", "1.5"]))
            .expect("parse");
        assert_eq!(row.entity, "BTC");
        assert!((row.price_usd - 1.5).abs() < 1e-12);
    }

    #[test]
    fn sentiment_row_rejects_non_numeric_and_nan() {
        let err = SentimentRow::from_fields(&fields(&["2025-06-06 17:00:00+00:00", "abc"]))
            .unwrap_err();
        assert!(err.contains("invalid sentiment"));
        let err = SentimentRow::from_fields(&fields(&["2025-06-06 17:00:00+00:00", "NaN"]))
            .unwrap_err();
        assert!(err.contains("non-finite"));
    }

    #[test]
    fn sentiment_row_rejects_values_outside_unit_range() {
        let err = SentimentRow::from_fields(&fields(&["2025-06-06 17:00:00+00:00", "1.5"]))
            .unwrap_err();
        assert!(err.contains("out of range"));
        let err = SentimentRow::from_fields(&fields(&["2025-06-06 17:00:00+00:00", "-1.01"]))
            .unwrap_err();
        assert!(err.contains("out of range"));

        let row = SentimentRow::from_fields(&fields(&["2025-06-06 17:00:00+00:00", "-1"]))
            .expect("lower bound is valid");
        assert_eq!(row.sentiment, -1.0);
    }
}
