use mood_domain::errors::PipelineError;
use mood_domain::services::sentiment::CommentFilter;
use mood_domain::value_objects::asset::{default_assets, TrackedAsset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Ten years of minutes.
pub const MAX_WINDOW_MINUTES: i64 = 10 * 365 * 24 * 60;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub paths: PathsConfig,
    pub prices: PricesConfig,
    pub comments: CommentsConfig,
    pub filter: CommentFilter,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct PathsConfig {
    pub raw_dir: String,
    pub processed_dir: String,
    pub price_series: String,
    pub sentiment_series: String,
    pub joined_dataset: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: "data/raw".to_string(),
            processed_dir: "data/processed".to_string(),
            price_series: "crypto_prices".to_string(),
            sentiment_series: "reddit_sentiment".to_string(),
            joined_dataset: "mood_market".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct PricesConfig {
    pub base_url: String,
    pub vs_currency: String,
    pub timeout_ms: u64,
    pub assets: Vec<TrackedAsset>,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            timeout_ms: 10_000,
            assets: default_assets(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct CommentsConfig {
    pub base_url: String,
    pub auth_url: String,
    pub public_base_url: String,
    pub subreddit: String,
    pub limit: usize,
    pub window_minutes: i64,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub stream_tag: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oauth.reddit.com".to_string(),
            auth_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            public_base_url: "https://www.reddit.com".to_string(),
            subreddit: "cryptocurrency".to_string(),
            limit: 200,
            window_minutes: 60,
            timeout_ms: 10_000,
            user_agent: "mood-app".to_string(),
            stream_tag: "REDDIT".to_string(),
        }
    }
}

impl Config {
    pub fn raw_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.raw_dir)
    }

    pub fn joined_dataset_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.processed_dir).join(format!("{}.csv", self.paths.joined_dataset))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: &str| Err(PipelineError::InvalidConfig(msg.to_string()));

        for (name, value) in [
            ("paths.raw_dir", &self.paths.raw_dir),
            ("paths.processed_dir", &self.paths.processed_dir),
            ("paths.price_series", &self.paths.price_series),
            ("paths.sentiment_series", &self.paths.sentiment_series),
            ("paths.joined_dataset", &self.paths.joined_dataset),
            ("prices.vs_currency", &self.prices.vs_currency),
            ("comments.subreddit", &self.comments.subreddit),
            ("comments.stream_tag", &self.comments.stream_tag),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineError::InvalidConfig(format!("{name} must not be empty")));
            }
        }

        if self.prices.assets.is_empty() {
            return invalid("prices.assets must list at least one asset");
        }
        let mut symbols = BTreeSet::new();
        for asset in &self.prices.assets {
            if asset.id.trim().is_empty() || asset.symbol.trim().is_empty() {
                return invalid("prices.assets entries need a non-empty id and symbol");
            }
            if !symbols.insert(asset.entity()) {
                return Err(PipelineError::InvalidConfig(format!(
                    "prices.assets symbol {} is listed more than once",
                    asset.entity()
                )));
            }
        }

        if self.prices.timeout_ms == 0 {
            return invalid("prices.timeout_ms must be > 0");
        }
        if self.comments.timeout_ms == 0 {
            return invalid("comments.timeout_ms must be > 0");
        }
        if self.comments.limit == 0 {
            return invalid("comments.limit must be > 0");
        }
        if self.comments.window_minutes <= 0 {
            return invalid("comments.window_minutes must be > 0");
        }
        if self.comments.window_minutes > MAX_WINDOW_MINUTES {
            return Err(PipelineError::InvalidConfig(format!(
                "comments.window_minutes must be <= {}",
                MAX_WINDOW_MINUTES
            )));
        }
        Ok(())
    }
}

/// Loads and validates `path`, or returns the validated defaults when no path
/// is given. The raw TOML is returned alongside for echoing back.
pub fn load_config_with_source(path: Option<&Path>) -> Result<(Config, String), PipelineError> {
    let (config, contents) = match path {
        Some(path) => {
            let contents = fs::read_to_string(path).map_err(|err| {
                PipelineError::InvalidConfig(format!(
                    "failed to read config {}: {}",
                    path.display(),
                    err
                ))
            })?;
            let config: Config = toml::from_str(&contents).map_err(|err| {
                PipelineError::InvalidConfig(format!(
                    "failed to parse TOML {}: {}",
                    path.display(),
                    err
                ))
            })?;
            (config, contents)
        }
        None => {
            let config = Config::default();
            let contents = to_toml_pretty(&config)?;
            (config, contents)
        }
    };
    config.validate()?;
    Ok((config, contents))
}

pub fn load_config(path: Option<&Path>) -> Result<Config, PipelineError> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn to_toml_pretty(config: &Config) -> Result<String, PipelineError> {
    toml::to_string_pretty(config).map_err(|err| {
        PipelineError::InvalidConfig(format!("failed to serialize config as TOML: {err}"))
    })
}
