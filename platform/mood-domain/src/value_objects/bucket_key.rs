use crate::services::bucketing::floor_to_hour;
use chrono::{DateTime, Utc};

/// Aggregation and join key. Construction always floors to the hour, so two
/// keys are equal iff hour and entity match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    hour_start: DateTime<Utc>,
    entity: String,
}

impl BucketKey {
    pub fn new(timestamp: DateTime<Utc>, entity: impl Into<String>) -> Self {
        Self {
            hour_start: floor_to_hour(timestamp),
            entity: entity.into(),
        }
    }

    pub fn hour_start(&self) -> DateTime<Utc> {
        self.hour_start
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }
}
