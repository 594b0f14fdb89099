use mood_application::config::Config;
use mood_domain::repositories::comment_source::CommentSource;
use mood_domain::repositories::dataset::DatasetWriter;
use mood_domain::repositories::price_source::PriceSource;
use mood_domain::repositories::scorer::SentimentScorer;
use mood_domain::repositories::series_store::SeriesStore;
use mood_infrastructure::comments::reddit::{RedditCommentSource, RedditCredentials, RedditSettings};
use mood_infrastructure::persistence::csv_series::CsvSeriesStore;
use mood_infrastructure::persistence::joined_csv::CsvDatasetWriter;
use mood_infrastructure::prices::coingecko::CoinGeckoPriceSource;
use mood_infrastructure::scoring::lexicon::LexiconScorer;
use std::env;

pub struct PriceDeps {
    pub source: Box<dyn PriceSource>,
    pub store: Box<dyn SeriesStore>,
}

pub struct SentimentDeps {
    pub source: Box<dyn CommentSource>,
    pub scorer: Box<dyn SentimentScorer>,
    pub store: Box<dyn SeriesStore>,
}

pub struct MergeDeps {
    pub store: Box<dyn SeriesStore>,
    pub writer: Box<dyn DatasetWriter>,
}

pub fn build_price_deps(config: &Config) -> Result<PriceDeps, String> {
    let source = CoinGeckoPriceSource::new(
        &config.prices.base_url,
        &config.prices.vs_currency,
        config.prices.timeout_ms,
    )
    .map_err(|err| err.to_string())?;
    Ok(PriceDeps {
        source: Box::new(source),
        store: build_series_store(config),
    })
}

pub fn build_sentiment_deps(config: &Config) -> Result<SentimentDeps, String> {
    let settings = RedditSettings {
        oauth_base_url: config.comments.base_url.clone(),
        public_base_url: config.comments.public_base_url.clone(),
        token_url: config.comments.auth_url.clone(),
        user_agent: resolve_user_agent(config),
        timeout_ms: config.comments.timeout_ms,
        credentials: resolve_reddit_credentials(),
    };
    let source = RedditCommentSource::new(settings).map_err(|err| err.to_string())?;
    Ok(SentimentDeps {
        source: Box::new(source),
        scorer: Box::new(LexiconScorer::new()),
        store: build_series_store(config),
    })
}

pub fn build_merge_deps(config: &Config) -> MergeDeps {
    MergeDeps {
        store: build_series_store(config),
        writer: Box::new(CsvDatasetWriter::new(config.joined_dataset_path())),
    }
}

fn build_series_store(config: &Config) -> Box<dyn SeriesStore> {
    Box::new(CsvSeriesStore::new(config.raw_dir()))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Credentials come from the environment only; without a client id the
/// public listing is used.
pub fn resolve_reddit_credentials() -> Option<RedditCredentials> {
    let client_id = non_empty_env("REDDIT_CLIENT_ID")?;
    Some(RedditCredentials {
        client_id,
        client_secret: non_empty_env("REDDIT_CLIENT_SECRET"),
    })
}

pub fn resolve_user_agent(config: &Config) -> String {
    non_empty_env("REDDIT_USER_AGENT").unwrap_or_else(|| config.comments.user_agent.clone())
}
