use chrono::{DateTime, Utc};

/// A raw comment as delivered by a comment source, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Community endorsement (upvotes minus downvotes).
    pub score: i64,
}

/// Polarity in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PolarityScore(f64);

impl PolarityScore {
    pub const NEUTRAL: PolarityScore = PolarityScore(0.0);

    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (-1.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Clamps into range; non-finite input is treated as neutral.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            return Self::NEUTRAL;
        }
        Self(value.clamp(-1.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredObservation {
    pub observed_at: DateTime<Utc>,
    pub entity: String,
    pub score: PolarityScore,
}
