use crate::http::build_client;
use mood_domain::errors::PipelineError;
use mood_domain::repositories::comment_source::{CommentQuery, CommentSource, CommentStream};
use mood_domain::value_objects::observation::CommentRecord;
use mood_domain::value_objects::timestamp::from_epoch_seconds;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::VecDeque;

pub const REDDIT_OAUTH_BASE: &str = "https://oauth.reddit.com";
pub const REDDIT_PUBLIC_BASE: &str = "https://www.reddit.com";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const SOURCE: &str = "reddit";
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    /// Installed-app clients have no secret; Reddit then expects an empty one.
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RedditSettings {
    pub oauth_base_url: String,
    pub public_base_url: String,
    pub token_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub credentials: Option<RedditCredentials>,
}

pub struct RedditCommentSource {
    settings: RedditSettings,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    #[serde(default)]
    kind: String,
    data: CommentData,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    #[serde(default)]
    body: String,
    created_utc: f64,
    #[serde(default)]
    score: i64,
}

impl RedditCommentSource {
    pub fn new(settings: RedditSettings) -> Result<Self, PipelineError> {
        let client = build_client(settings.timeout_ms, &settings.user_agent)
            .map_err(|reason| PipelineError::source_unavailable(SOURCE, reason))?;
        Ok(Self { settings, client })
    }

    /// Application-only OAuth token, or `None` when running unauthenticated.
    fn authorize(&self) -> Result<Option<String>, PipelineError> {
        let Some(credentials) = self.settings.credentials.as_ref() else {
            return Ok(None);
        };

        let response = self
            .client
            .post(&self.settings.token_url)
            .basic_auth(
                &credentials.client_id,
                Some(credentials.client_secret.as_deref().unwrap_or("")),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|err| {
                PipelineError::source_unavailable(SOURCE, format!("token request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::source_unavailable(
                SOURCE,
                format!("token request failed with status {status}"),
            ));
        }
        let token: TokenResponse = response.json().map_err(|err| {
            PipelineError::source_unavailable(SOURCE, format!("token response parse failed: {err}"))
        })?;
        Ok(Some(token.access_token))
    }

    fn listing_url(&self, feed: &str, authorized: bool) -> String {
        let feed = feed.trim().trim_start_matches("r/");
        if authorized {
            format!(
                "{}/r/{}/comments",
                self.settings.oauth_base_url.trim_end_matches('/'),
                feed
            )
        } else {
            format!(
                "{}/r/{}/comments.json",
                self.settings.public_base_url.trim_end_matches('/'),
                feed
            )
        }
    }

    fn fetch_page(
        &self,
        url: &str,
        token: Option<&str>,
        page_size: usize,
        after: Option<&str>,
    ) -> Result<ListingData, PipelineError> {
        let mut params = vec![
            ("limit", page_size.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            params.push(("after", after.to_string()));
        }

        metrics::counter!("mood.infra.http.requests_total", "source" => SOURCE).increment(1);
        let mut request = self.client.get(url).query(&params);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(|err| {
            PipelineError::source_unavailable(SOURCE, format!("listing request failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::source_unavailable(
                SOURCE,
                format!("listing request failed with status {status}"),
            ));
        }
        let listing: Listing = response.json().map_err(|err| {
            PipelineError::source_unavailable(SOURCE, format!("listing parse failed: {err}"))
        })?;
        Ok(listing.data)
    }
}

impl CommentSource for RedditCommentSource {
    fn comments(&self, query: &CommentQuery) -> Result<CommentStream<'_>, PipelineError> {
        let token = self.authorize()?;
        let url = self.listing_url(&query.feed, token.is_some());
        tracing::debug!(%url, limit = query.limit, authorized = token.is_some(), "streaming comments");
        Ok(Box::new(CommentPages {
            source: self,
            url,
            token,
            remaining: query.limit,
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }))
    }
}

/// Fetches listing pages on demand until the ceiling is reached or the feed
/// has no further page. The first failure ends the stream.
struct CommentPages<'a> {
    source: &'a RedditCommentSource,
    url: String,
    token: Option<String>,
    remaining: usize,
    after: Option<String>,
    buffer: VecDeque<CommentRecord>,
    exhausted: bool,
}

impl CommentPages<'_> {
    fn load_next_page(&mut self) -> Result<(), PipelineError> {
        let page_size = self.remaining.min(MAX_PAGE_SIZE);
        let data = self.source.fetch_page(
            &self.url,
            self.token.as_deref(),
            page_size,
            self.after.as_deref(),
        )?;

        let page_was_empty = data.children.is_empty();
        for child in data.children {
            if !child.kind.is_empty() && child.kind != "t1" {
                continue;
            }
            let Some(created_at) = from_epoch_seconds(child.data.created_utc) else {
                tracing::warn!(created_utc = child.data.created_utc, "skipping comment with invalid timestamp");
                continue;
            };
            self.buffer.push_back(CommentRecord {
                text: child.data.body,
                created_at,
                score: child.data.score,
            });
        }

        tracing::debug!(buffered = self.buffer.len(), after = ?data.after, "comment page loaded");
        // Skipped children still advance the cursor; only an empty page or a
        // missing or repeated cursor ends the listing.
        match data.after {
            Some(after) if !page_was_empty && self.after.as_deref() != Some(after.as_str()) => {
                self.after = Some(after)
            }
            _ => self.exhausted = true,
        }
        Ok(())
    }
}

impl Iterator for CommentPages<'_> {
    type Item = Result<CommentRecord, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == 0 {
                return None;
            }
            if let Some(comment) = self.buffer.pop_front() {
                self.remaining -= 1;
                return Some(Ok(comment));
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.load_next_page() {
                self.exhausted = true;
                self.remaining = 0;
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Listing, RedditCommentSource, RedditSettings};

    fn settings() -> RedditSettings {
        RedditSettings {
            oauth_base_url: "https://oauth.example/".to_string(),
            public_base_url: "https://www.example".to_string(),
            token_url: "https://www.example/api/v1/access_token".to_string(),
            user_agent: "mood-app-test".to_string(),
            timeout_ms: 1_000,
            credentials: None,
        }
    }

    #[test]
    fn listing_url_depends_on_authorization() {
        let source = RedditCommentSource::new(settings()).expect("source");
        assert_eq!(
            source.listing_url("cryptocurrency", true),
            "https://oauth.example/r/cryptocurrency/comments"
        );
        assert_eq!(
            source.listing_url("r/cryptocurrency", false),
            "https://www.example/r/cryptocurrency/comments.json"
        );
    }

    #[test]
    fn listing_payload_deserializes_with_missing_optional_fields() {
        let raw = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {"kind": "t1", "data": {"body": "hello", "created_utc": 1749229200.0, "score": 3}},
                    {"kind": "t1", "data": {"created_utc": 1749229100}}
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(raw).expect("parse");
        assert!(listing.data.after.is_none());
        assert_eq!(listing.data.children.len(), 2);
        assert_eq!(listing.data.children[1].data.body, "");
        assert_eq!(listing.data.children[1].data.score, 0);
    }
}
