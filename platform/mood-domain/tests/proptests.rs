use chrono::{DateTime, Utc};
use mood_domain::repositories::scorer::SentimentScorer;
use mood_domain::services::alignment::align;
use mood_domain::services::bucketing::floor_to_hour;
use mood_domain::services::sentiment::{
    mean_by_bucket, CommentFilter, ObservationWindow, SentimentAggregator,
};
use mood_domain::value_objects::observation::{CommentRecord, PolarityScore, ScoredObservation};
use mood_domain::value_objects::rows::{PriceRow, SentimentRow};
use proptest::prelude::*;
use std::collections::BTreeSet;

// 1970-01-01 .. 2100-01-01
const MAX_SECONDS: i64 = 4_102_444_800;

fn ts(seconds: i64, nanos: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, nanos).expect("in range")
}

fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..MAX_SECONDS, 0u32..1_000_000_000).prop_map(|(s, n)| ts(s, n))
}

struct MarkerScorer;

impl SentimentScorer for MarkerScorer {
    fn polarity(&self, text: &str) -> f64 {
        // Encodes the score in the text so tests can generate arbitrary values.
        text.rsplit('|')
            .next()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0)
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn bucketing_is_idempotent(t in instant()) {
        let once = floor_to_hour(t);
        prop_assert_eq!(floor_to_hour(once), once);
        prop_assert!(once <= t);
        prop_assert!(t - once < chrono::TimeDelta::hours(1));
    }

    #[test]
    fn bucketing_is_monotonic(a in instant(), b in instant()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(floor_to_hour(lo) <= floor_to_hour(hi));
    }

    #[test]
    fn mean_is_order_independent(
        values in prop::collection::vec((0i64..7_200, -1.0f64..=1.0), 1..40),
        seed in any::<u64>(),
    ) {
        let observations: Vec<ScoredObservation> = values
            .iter()
            .map(|(offset, v)| ScoredObservation {
                observed_at: ts(1_749_229_200 + offset, 0),
                entity: "REDDIT".to_string(),
                score: PolarityScore::new(*v).expect("in range"),
            })
            .collect();

        let mut shuffled = observations.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }

        prop_assert_eq!(mean_by_bucket(&observations), mean_by_bucket(&shuffled));
    }

    #[test]
    fn filtered_comments_never_reach_an_aggregate(
        comments in prop::collection::vec(
            ("[a-z ]{0,40}", -5i64..5, 0i64..3_600, -1.0f64..=1.0),
            0..40,
        ),
    ) {
        let now = ts(1_749_232_800, 0);
        let window = ObservationWindow::trailing(now, 60);
        let filter = CommentFilter::default();
        let records: Vec<CommentRecord> = comments
            .iter()
            .map(|(body, score, age, polarity)| CommentRecord {
                text: format!("{body}|{polarity}"),
                created_at: ts(now.timestamp() - age, 0),
                score: *score,
            })
            .collect();

        let mut agg = SentimentAggregator::new("REDDIT", window, filter, &MarkerScorer);
        for record in &records {
            let _ = agg.ingest(record);
        }
        let (rows, report) = agg.finish();

        let qualifying: Vec<&CommentRecord> = records
            .iter()
            .filter(|r| filter.check(r).is_ok())
            .collect();
        prop_assert_eq!(report.scored, qualifying.len());
        let total_samples: usize = rows.iter().map(|r| r.samples).sum();
        prop_assert_eq!(total_samples, qualifying.len());
        prop_assert!(rows.iter().all(|r| (-1.0..=1.0).contains(&r.value)));
        if qualifying.is_empty() {
            prop_assert!(rows.is_empty());
        }
    }

    #[test]
    fn join_keeps_exactly_the_shared_hours(
        price_hours in prop::collection::vec(0i64..48, 0..20),
        sentiment_hours in prop::collection::vec(0i64..48, 0..20),
    ) {
        let base = 1_749_168_000i64;
        let prices: Vec<PriceRow> = price_hours
            .iter()
            .map(|h| PriceRow {
                timestamp: ts(base + h * 3_600 + 300, 0),
                entity: "BTC".to_string(),
                price_usd: 68_000.0,
            })
            .collect();
        let sentiment: Vec<SentimentRow> = sentiment_hours
            .iter()
            .map(|h| SentimentRow {
                timestamp: ts(base + h * 3_600, 0),
                sentiment: 0.1,
            })
            .collect();

        let (rows, _) = align(&prices, &sentiment);
        let joined: BTreeSet<i64> = rows.iter().map(|r| r.hour_start.timestamp()).collect();
        let p: BTreeSet<i64> = price_hours.iter().map(|h| base + h * 3_600).collect();
        let s: BTreeSet<i64> = sentiment_hours.iter().map(|h| base + h * 3_600).collect();
        let expected: BTreeSet<i64> = p.intersection(&s).copied().collect();
        prop_assert_eq!(joined, expected);

        let (again, _) = align(&prices, &sentiment);
        prop_assert_eq!(rows, again);
    }
}
