//! Rotten Tomatoes-style API client.
//!
//! Implements [`MovieProvider`] against the public JSON surface:
//! `movies/{id}.json`, `movie_alias.json`, `movies.json?q=...` and
//! `lists/{type}/{name}.json`. Every operation follows the same shape:
//! issue request, log-and-return-empty on transport failure, parse JSON,
//! log-and-return-empty on parse failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::provider::{MovieListResponse, MoviePayload, MovieProvider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Concrete client for the provider API.
///
/// # Examples
///
/// ```no_run
/// use reelcache::config::ProviderConfig;
/// use reelcache::provider::RottenTomatoesClient;
///
/// let client = RottenTomatoesClient::new(&ProviderConfig::default());
/// ```
pub struct RottenTomatoesClient {
    client: reqwest::Client,
    server: String,
    api_version: String,
    api_key: String,
}

impl RottenTomatoesClient {
    /// Create a new client from provider configuration.
    pub fn new(config: &ProviderConfig) -> Self {
        let timeout = if config.timeout_secs > 0 {
            Duration::from_secs(config.timeout_secs)
        } else {
            REQUEST_TIMEOUT
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            server: config.server.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Issue a GET and parse the body as JSON, swallowing transport and
    /// parse failures.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        debug!(url = %url, "fetching json");
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "request failed");
                return None;
            }
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "request returned error status");
                return None;
            }
        };
        match response.json::<T>().await {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(url = %url, error = %e, "provider returned invalid json");
                None
            }
        }
    }
}

#[async_trait]
impl MovieProvider for RottenTomatoesClient {
    async fn movie_info(&self, id: i64) -> Option<MoviePayload> {
        let url = format!(
            "{}/{}/movies/{}.json?apikey={}",
            self.server, self.api_version, id, self.api_key
        );
        self.get_json::<MoviePayload>(&url)
            .await
            .filter(has_usable_id)
    }

    async fn movie_alias(&self, alias_id: &str, namespace: &str) -> Option<MoviePayload> {
        let alias_id = strip_alias_prefix(alias_id, namespace);
        let url = format!(
            "{}/{}/movie_alias.json?id={}&type={}",
            self.server, self.api_version, alias_id, namespace
        );
        self.get_json::<MoviePayload>(&url)
            .await
            .filter(has_usable_id)
    }

    async fn search(
        &self,
        query: &str,
        page_limit: Option<u32>,
        page: Option<u32>,
    ) -> Vec<MoviePayload> {
        let mut url = format!(
            "{}/{}/movies.json?q={}&apikey={}",
            self.server,
            self.api_version,
            urlencoded(query),
            self.api_key
        );
        if let Some(page_limit) = page_limit {
            url.push_str(&format!("&page_limit={page_limit}"));
        }
        if let Some(page) = page {
            url.push_str(&format!("&page={page}"));
        }

        let response: MovieListResponse = match self.get_json(&url).await {
            Some(response) => response,
            None => return Vec::new(),
        };
        if response.total.unwrap_or(0) == 0 {
            return Vec::new();
        }
        response.movies.unwrap_or_default()
    }

    async fn list(
        &self,
        list_type: &str,
        list_name: &str,
        country: &str,
        limit: u32,
        page_limit: u32,
        page: Option<u32>,
    ) -> Vec<MoviePayload> {
        let mut url = format!(
            "{}/{}/lists/{}/{}.json?apikey={}&country={}&limit={}&page_limit={}",
            self.server,
            self.api_version,
            underscored(list_type),
            underscored(list_name),
            self.api_key,
            country,
            limit,
            page_limit
        );
        if let Some(page) = page {
            url.push_str(&format!("&page={page}"));
        }

        let response: MovieListResponse = match self.get_json(&url).await {
            Some(response) => response,
            None => return Vec::new(),
        };
        response.movies.unwrap_or_default()
    }
}

/// A single-movie payload is only usable when it carries a nonzero id.
fn has_usable_id(payload: &MoviePayload) -> bool {
    payload.id.is_some_and(|id| id != 0)
}

/// For the imdb namespace the provider expects the bare numeric id, so a
/// leading non-numeric prefix (`tt`) is stripped.
fn strip_alias_prefix<'a>(alias_id: &'a str, namespace: &str) -> &'a str {
    if namespace == "imdb" {
        alias_id.trim_start_matches(|c: char| !c.is_ascii_digit())
    } else {
        alias_id
    }
}

/// Minimal percent-encoding for query parameter values; spaces become `+`.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// List types and names use underscores where a caller would write spaces.
fn underscored(s: &str) -> String {
    s.replace(' ', "_")
}
