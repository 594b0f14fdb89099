use serde::{Deserialize, Serialize};

/// A priced asset: the identifier the price source understands and the
/// uppercase symbol written to the price series.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrackedAsset {
    pub id: String,
    pub symbol: String,
}

impl TrackedAsset {
    pub fn new(id: impl Into<String>, symbol: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.as_ref().trim().to_uppercase(),
        }
    }

    pub fn entity(&self) -> String {
        self.symbol.trim().to_uppercase()
    }
}

pub fn default_assets() -> Vec<TrackedAsset> {
    vec![
        TrackedAsset::new("bitcoin", "BTC"),
        TrackedAsset::new("ethereum", "ETH"),
    ]
}
