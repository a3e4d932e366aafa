//! Trait definition and payload types for the metadata provider.
//!
//! [`MovieProvider`] is the seam between the resolution orchestrator and the
//! external API: every operation is tolerant of transport and parse failure,
//! returning an empty result instead of an error, so the orchestrator's
//! fallback chain stays uniform.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

pub mod rotten_tomatoes;

pub use rotten_tomatoes::RottenTomatoesClient;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// A single movie object as returned by the provider, either as a search hit
/// or as a full detail payload.
///
/// Every field is optional: the provider omits fields freely and a payload
/// is only considered usable when it carries a nonzero `id`. Mapping into
/// the cache model is an explicit field-by-field step ([`super::lookup`]);
/// unknown keys are ignored by contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePayload {
    #[serde(default, deserialize_with = "de_loose_i64")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_loose_i32")]
    pub year: Option<i32>,
    #[serde(default)]
    pub mpaa_rating: Option<String>,
    #[serde(default, deserialize_with = "de_loose_i64")]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub critics_consensus: Option<String>,
    #[serde(default)]
    pub ratings: Option<RatingsPayload>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub abridged_cast: Option<Vec<PersonPayload>>,
    #[serde(default)]
    pub abridged_directors: Option<Vec<PersonPayload>>,
    #[serde(default)]
    pub release_dates: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub posters: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "de_loose_string_map")]
    pub alternate_ids: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub links: Option<BTreeMap<String, String>>,
}

impl MoviePayload {
    /// The alternate id stored for `namespace`, if any.
    pub fn alternate_id(&self, namespace: &str) -> Option<&str> {
        self.alternate_ids
            .as_ref()
            .and_then(|ids| ids.get(namespace))
            .map(String::as_str)
    }
}

/// Critic and audience rating block nested in a movie payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingsPayload {
    #[serde(default)]
    pub critics_rating: Option<String>,
    #[serde(default, deserialize_with = "de_loose_i64")]
    pub critics_score: Option<i64>,
    #[serde(default)]
    pub audience_rating: Option<String>,
    #[serde(default, deserialize_with = "de_loose_i64")]
    pub audience_score: Option<i64>,
}

/// Abridged cast / director entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPayload {
    #[serde(default)]
    pub name: Option<String>,
}

/// Envelope for multi-result responses (search and curated lists).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieListResponse {
    #[serde(default, deserialize_with = "de_loose_i64")]
    pub total: Option<i64>,
    #[serde(default)]
    pub movies: Option<Vec<MoviePayload>>,
}

// The provider is loose about numeric types: ids and scores arrive as JSON
// numbers or as numeric strings, and empty strings stand in for null.

fn de_loose_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(loose_int(value.as_ref()))
}

fn de_loose_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(loose_int(value.as_ref()).and_then(|n| i32::try_from(n).ok()))
}

fn loose_int(value: Option<&serde_json::Value>) -> Option<i64> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_loose_string_map<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(value.map(|map| {
        map.into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                serde_json::Value::Number(n) => Some((key, n.to_string())),
                _ => None,
            })
            .collect()
    }))
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait fronting the external metadata API.
///
/// Transport failures and malformed JSON are logged and swallowed inside the
/// implementation; an empty return always means "this query produced no
/// usable result", never a hard error.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Fetch full movie details by the provider's own id. `None` unless the
    /// payload carries a nonzero id.
    async fn movie_info(&self, id: i64) -> Option<MoviePayload>;

    /// Fetch full movie details through an external alias (e.g. an imdb id).
    /// For the `"imdb"` namespace a leading non-numeric prefix is stripped
    /// before querying.
    async fn movie_alias(&self, alias_id: &str, namespace: &str) -> Option<MoviePayload>;

    /// Free-text search. Empty unless the response reports a nonzero total
    /// and a non-empty candidate list.
    async fn search(
        &self,
        query: &str,
        page_limit: Option<u32>,
        page: Option<u32>,
    ) -> Vec<MoviePayload>;

    /// Enumerate a curated list (e.g. `"dvds"` / `"new releases"`). Empty
    /// unless the movie list is non-empty.
    async fn list(
        &self,
        list_type: &str,
        list_name: &str,
        country: &str,
        limit: u32,
        page_limit: u32,
        page: Option<u32>,
    ) -> Vec<MoviePayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accepts_numeric_string_ids() {
        let payload: MoviePayload = serde_json::from_value(serde_json::json!({
            "id": "770672122",
            "title": "Up",
            "year": "2009",
            "runtime": ""
        }))
        .unwrap();
        assert_eq!(payload.id, Some(770672122));
        assert_eq!(payload.year, Some(2009));
        assert_eq!(payload.runtime, None);
    }

    #[test]
    fn payload_accepts_plain_numbers() {
        let payload: MoviePayload = serde_json::from_value(serde_json::json!({
            "id": 770672122,
            "year": 2009,
            "runtime": 96,
            "ratings": {"critics_score": 98, "audience_score": "90"}
        }))
        .unwrap();
        assert_eq!(payload.id, Some(770672122));
        assert_eq!(payload.runtime, Some(96));
        let ratings = payload.ratings.unwrap();
        assert_eq!(ratings.critics_score, Some(98));
        assert_eq!(ratings.audience_score, Some(90));
    }

    #[test]
    fn alternate_ids_normalize_to_strings() {
        let payload: MoviePayload = serde_json::from_value(serde_json::json!({
            "id": 1,
            "alternate_ids": {"imdb": 1049413, "flixster": "12886"}
        }))
        .unwrap();
        assert_eq!(payload.alternate_id("imdb"), Some("1049413"));
        assert_eq!(payload.alternate_id("flixster"), Some("12886"));
        assert_eq!(payload.alternate_id("tmdb"), None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let payload: MoviePayload = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Up",
            "box_office": 731342744
        }))
        .unwrap();
        assert_eq!(payload.title.as_deref(), Some("Up"));
    }
}
