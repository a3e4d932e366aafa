//! Rust models matching the cache schema.
//!
//! [`MovieRecord`] is a fully materialized snapshot: every owned collection
//! and the names of every shared reference are loaded into the struct, so a
//! returned record has no dependency on a live connection.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A named release-date entry owned by a movie (e.g. "theater", "dvd").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseDate {
    pub name: String,
    pub date: Option<String>,
}

/// A named poster URL owned by a movie (e.g. "original", "thumbnail").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Poster {
    pub name: String,
    pub url: String,
}

/// An external identifier scheme mapped to the provider's own id,
/// e.g. name "imdb" with ext_id "1049413".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlternateId {
    pub name: String,
    pub ext_id: String,
}

/// A named related-link URL owned by a movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub url: String,
}

/// Cached movie model.
///
/// `id` is the provider's numeric id, immutable once assigned, and the sole
/// cache key for direct id lookups. On refresh the scalar fields are
/// overwritten and every collection below is replaced wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub mpaa_rating: Option<String>,
    pub runtime: Option<i64>,
    pub critics_consensus: Option<String>,
    pub critics_rating: Option<String>,
    pub critics_score: Option<i64>,
    pub audience_rating: Option<String>,
    pub audience_score: Option<i64>,
    pub synopsis: Option<String>,
    pub studio: Option<String>,
    /// Last successful refresh from the provider; the clock for the
    /// freshness policy. `None` means never refreshed.
    pub updated_at: Option<DateTime<Utc>>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub directors: Vec<String>,
    pub release_dates: Vec<ReleaseDate>,
    pub posters: Vec<Poster>,
    pub alternate_ids: Vec<AlternateId>,
    pub links: Vec<Link>,
}

impl MovieRecord {
    /// True when the cached details are considered expired and need a
    /// refresh, evaluated against `now`.
    ///
    /// A record that was never refreshed is always expired. Otherwise the
    /// refresh interval grows with the movie's age: `2 + age * 5` days,
    /// where `age` is in whole years (omitted when the release year is
    /// unknown, clamped at zero for future releases). Old stable titles get
    /// long cache lifetimes; recent releases recheck their scores quickly.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let updated = match self.updated_at {
            Some(updated) => updated,
            None => {
                tracing::debug!(id = self.id, title = %self.title, "never refreshed");
                return true;
            }
        };
        let mut refresh_interval: i64 = 2;
        if let Some(year) = self.year {
            let age = i64::from(now.year() - year).max(0);
            refresh_interval += age * 5;
            tracing::debug!(
                title = %self.title,
                age,
                days = refresh_interval,
                "expiration window"
            );
        }
        updated < now - Duration::days(refresh_interval)
    }

    /// True when the cached details are expired as of the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The external id stored for `namespace`, if any (e.g. "imdb").
    pub fn alternate_id(&self, namespace: &str) -> Option<&str> {
        self.alternate_ids
            .iter()
            .find(|alt| alt.name == namespace)
            .map(|alt| alt.ext_id.as_str())
    }
}
