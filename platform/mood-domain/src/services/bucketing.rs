use chrono::{DateTime, Utc};

const MINUTE_SECONDS: i64 = 60;
const HOUR_SECONDS: i64 = 3_600;

/// Start of the UTC hour containing `ts`. Idempotent and monotonic.
pub fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    floor_to_step(ts, HOUR_SECONDS)
}

/// Start of the UTC minute containing `ts`.
pub fn floor_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    floor_to_step(ts, MINUTE_SECONDS)
}

fn floor_to_step(ts: DateTime<Utc>, step_seconds: i64) -> DateTime<Utc> {
    let seconds = ts.timestamp();
    let floored = seconds - seconds.rem_euclid(step_seconds);
    // The representable range starts on an hour boundary, so `floored` is
    // always in range.
    DateTime::from_timestamp(floored, 0).unwrap_or(ts)
}
