use crate::services::bucketing::floor_to_minute;
use crate::value_objects::asset::TrackedAsset;
use crate::value_objects::rows::PriceRow;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One row per tracked asset, in configured order, carrying the literal
/// fetched price. No averaging happens here; repeated runs in the same hour
/// produce repeated rows.
pub fn price_rows(
    assets: &[TrackedAsset],
    quotes: &BTreeMap<String, f64>,
    run_at: DateTime<Utc>,
) -> Result<Vec<PriceRow>, String> {
    let timestamp = floor_to_minute(run_at);
    let mut rows = Vec::with_capacity(assets.len());
    for asset in assets {
        let price = *quotes
            .get(&asset.id)
            .ok_or_else(|| format!("no quote returned for '{}'", asset.id))?;
        if !price.is_finite() || price < 0.0 {
            return Err(format!("invalid quote for '{}': {}", asset.id, price));
        }
        rows.push(PriceRow {
            timestamp,
            entity: asset.entity(),
            price_usd: price,
        });
    }
    Ok(rows)
}
