use crate::http::{build_client, DEFAULT_USER_AGENT};
use mood_domain::errors::PipelineError;
use mood_domain::repositories::price_source::PriceSource;
use reqwest::blocking::Client;
use std::collections::BTreeMap;
use std::time::Instant;

pub const COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";
const SOURCE: &str = "coingecko";

pub struct CoinGeckoPriceSource {
    base_url: String,
    vs_currency: String,
    client: Client,
}

impl CoinGeckoPriceSource {
    pub fn new(base_url: &str, vs_currency: &str, timeout_ms: u64) -> Result<Self, PipelineError> {
        let client = build_client(timeout_ms, DEFAULT_USER_AGENT)
            .map_err(|reason| PipelineError::source_unavailable(SOURCE, reason))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            vs_currency: vs_currency.trim().to_lowercase(),
            client,
        })
    }
}

impl PriceSource for CoinGeckoPriceSource {
    fn fetch_prices(&self, ids: &[String]) -> Result<BTreeMap<String, f64>, PipelineError> {
        let span = tracing::info_span!("coingecko.simple_price", ids = ids.len());
        let _enter = span.enter();

        let url = format!("{}/simple/price", self.base_url);
        let start = Instant::now();
        metrics::counter!("mood.infra.http.requests_total", "source" => SOURCE).increment(1);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", ids.join(",")),
                ("vs_currencies", self.vs_currency.clone()),
            ])
            .send()
            .map_err(|err| PipelineError::source_unavailable(SOURCE, format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::source_unavailable(
                SOURCE,
                format!("request failed with status {status}"),
            ));
        }

        let payload: serde_json::Value = response.json().map_err(|err| {
            PipelineError::source_unavailable(SOURCE, format!("response parse failed: {err}"))
        })?;
        let quotes = parse_simple_price(&payload, &self.vs_currency)
            .map_err(|reason| PipelineError::source_unavailable(SOURCE, reason))?;

        tracing::debug!(
            quotes = quotes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "price quotes fetched"
        );
        Ok(quotes)
    }
}

/// `{"bitcoin": {"usd": 68510}, ...}` to `{"bitcoin": 68510.0}`. Ids without a
/// quote in `vs_currency` are left out; the caller decides whether that is
/// fatal.
fn parse_simple_price(
    payload: &serde_json::Value,
    vs_currency: &str,
) -> Result<BTreeMap<String, f64>, String> {
    let entries = payload
        .as_object()
        .ok_or_else(|| "unexpected response shape: expected an object".to_string())?;

    let mut quotes = BTreeMap::new();
    for (id, by_currency) in entries {
        let Some(value) = by_currency.get(vs_currency) else {
            continue;
        };
        let price = value
            .as_f64()
            .ok_or_else(|| format!("non-numeric {vs_currency} price for '{id}': {value}"))?;
        quotes.insert(id.clone(), price);
    }
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::parse_simple_price;

    #[test]
    fn parses_nested_currency_map() {
        let payload = serde_json::json!({
            "bitcoin": {"usd": 68510},
            "ethereum": {"usd": 3550.25}
        });
        let quotes = parse_simple_price(&payload, "usd").expect("parse");
        assert_eq!(quotes.len(), 2);
        assert!((quotes["bitcoin"] - 68510.0).abs() < 1e-9);
        assert!((quotes["ethereum"] - 3550.25).abs() < 1e-9);
    }

    #[test]
    fn skips_ids_without_the_currency() {
        let payload = serde_json::json!({"bitcoin": {"eur": 60000}});
        let quotes = parse_simple_price(&payload, "usd").expect("parse");
        assert!(quotes.is_empty());
    }

    #[test]
    fn rejects_non_numeric_price_and_bad_shape() {
        let payload = serde_json::json!({"bitcoin": {"usd": "a lot"}});
        assert!(parse_simple_price(&payload, "usd").is_err());
        assert!(parse_simple_price(&serde_json::json!([1, 2]), "usd").is_err());
    }
}
