//! Resolution orchestrator.
//!
//! `lookup_movie` drives one lookup end to end: normalize the criteria,
//! probe the cache in precedence order (id, alternate id, title, remembered
//! search string), decide whether the cached record is fresh enough, and on
//! a miss resolve from the provider through an ordered fallback chain
//! (alias, id, free-text search + matcher). Expected "this strategy didn't
//! pan out" outcomes are empty results, never errors; the taxonomy errors
//! abort the whole call.

use chrono::{DateTime, Utc};
use reelcache_common::{Error, Result};
use reelcache_db::models::{AlternateId, Link, MovieRecord, Poster, ReleaseDate};
use reelcache_db::pool::{get_conn, DbPool};
use reelcache_db::queries::{memos, movies};
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::matcher;
use crate::provider::{MoviePayload, MovieProvider};
use crate::titles;

/// Namespace of the industry-standard alternate id the engine prefers for
/// refetches.
pub const IMDB: &str = "imdb";

/// Criteria for one lookup call. Any combination may be supplied; the most
/// specific criterion wins.
#[derive(Debug, Clone, Default)]
pub struct LookupRequest {
    /// Movie title.
    pub title: Option<String>,
    /// Release year, used to narrow title matches and filter candidates.
    pub year: Option<i32>,
    /// The provider's own id of the desired movie.
    pub provider_id: Option<i64>,
    /// Imdb id of the desired movie (with or without the `tt` prefix).
    pub imdb_id: Option<String>,
    /// Free-text guess to clean and parse into a title and year.
    pub smart_match: Option<String>,
    /// Never go online; fail with `NotFoundInCache` on a cache miss.
    pub only_cached: bool,
}

impl LookupRequest {
    /// Lookup by title, optionally narrowed by year.
    pub fn by_title(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: Some(title.into()),
            year,
            ..Default::default()
        }
    }

    /// Lookup from a free-text guess (e.g. a release or file name).
    pub fn from_guess(guess: impl Into<String>) -> Self {
        Self {
            smart_match: Some(guess.into()),
            ..Default::default()
        }
    }
}

/// Alternate ids are stored in the provider's bare numeric form, so a
/// caller-supplied `tt`-prefixed imdb id must be normalized before it can
/// probe the cache.
fn normalize_imdb_id(raw: &str) -> String {
    raw.trim_start_matches(|c: char| !c.is_ascii_digit())
        .to_string()
}

/// Criteria rendered for log lines and error messages.
fn describe(
    title: Option<&str>,
    year: Option<i32>,
    provider_id: Option<i64>,
    imdb_id: Option<&str>,
) -> String {
    format!(
        "<title={},year={},id={},imdb_id={}>",
        title.unwrap_or("None"),
        year.map_or_else(|| "None".to_string(), |y| y.to_string()),
        provider_id.map_or_else(|| "None".to_string(), |id| id.to_string()),
        imdb_id.unwrap_or("None"),
    )
}

/// Resolve a movie matching the request and return its cached record.
///
/// The returned record is a fully materialized snapshot: every owned
/// collection is loaded, so it stays usable independent of the pool.
pub async fn lookup_movie(
    pool: &DbPool,
    provider: &dyn MovieProvider,
    request: &LookupRequest,
) -> Result<MovieRecord> {
    let mut title = request.title.clone();
    let mut year = request.year;
    let provider_id = request.provider_id;
    let imdb_id = request.imdb_id.as_deref().map(normalize_imdb_id);

    // A free-text guess only applies when no more specific criterion exists
    if let Some(guess) = &request.smart_match {
        if title.is_none() && provider_id.is_none() && imdb_id.is_none() {
            let parsed = titles::parse_title(guess);
            if parsed.name.is_empty() {
                return Err(Error::invalid_criteria(format!(
                    "failed to parse name from `{guess}`"
                )));
            }
            year = year.or(parsed.year);
            title = Some(parsed.name);
        }
    }

    if title.is_none() && provider_id.is_none() && imdb_id.is_none() {
        return Err(Error::invalid_criteria(describe(None, year, None, None)));
    }

    let search_string = title.as_ref().map(|t| {
        let mut s = t.to_lowercase();
        if let Some(y) = year {
            s.push(' ');
            s.push_str(&y.to_string());
        }
        s
    });

    let criteria = describe(title.as_deref(), year, provider_id, imdb_id.as_deref());
    debug!(criteria = %criteria, "looking up movie");

    let mut conn = get_conn(pool)?;

    let cached = probe_cache(
        &conn,
        provider_id,
        imdb_id.as_deref(),
        title.as_deref(),
        year,
        search_string.as_deref(),
    )?;

    if let Some(cached) = cached {
        if cached.is_expired() && !request.only_cached {
            debug!(criteria = %criteria, "cache expired, refreshing from provider");
            return refresh_movie(&mut conn, provider, cached).await;
        }
        debug!(criteria = %criteria, "restored from cache");
        return Ok(cached);
    }

    if request.only_cached {
        return Err(Error::not_found_in_cache(criteria));
    }

    debug!(criteria = %criteria, "not cached, resolving from provider");
    let resolved = resolve_from_provider(
        &mut conn,
        provider,
        title.as_deref(),
        year,
        provider_id,
        imdb_id.as_deref(),
        search_string.as_deref(),
    )
    .await?;

    match resolved {
        Some(id) => movies::get_movie(&conn, id)?
            .ok_or_else(|| Error::internal(format!("resolved movie {id} missing from cache"))),
        None => Err(Error::no_results(criteria)),
    }
}

/// Cache probe in precedence order: direct id, alternate id, title (+year),
/// remembered search string.
fn probe_cache(
    conn: &Connection,
    provider_id: Option<i64>,
    imdb_id: Option<&str>,
    title: Option<&str>,
    year: Option<i32>,
    search_string: Option<&str>,
) -> Result<Option<MovieRecord>> {
    if let Some(id) = provider_id {
        if let Some(movie) = movies::get_movie(conn, id)? {
            return Ok(Some(movie));
        }
    }
    if let Some(imdb) = imdb_id {
        if let Some(id) = movies::find_id_by_alternate(conn, IMDB, imdb)? {
            return movies::get_movie(conn, id);
        }
    }
    if let Some(title) = title {
        if let Some(id) = movies::find_id_by_title(conn, title, year)? {
            return movies::get_movie(conn, id);
        }
        if let Some(search) = search_string {
            if let Some(id) = memos::find_memo(conn, search)? {
                return movies::get_movie(conn, id);
            }
        }
    }
    Ok(None)
}

/// Refresh an expired record in place, preferring an alias refetch when an
/// imdb alternate id is stored. On a failed provider call the stale record
/// is returned rather than failing the lookup.
async fn refresh_movie(
    conn: &mut Connection,
    provider: &dyn MovieProvider,
    cached: MovieRecord,
) -> Result<MovieRecord> {
    let fresh = match cached.alternate_id(IMDB) {
        Some(imdb) => provider.movie_alias(imdb, IMDB).await,
        None => provider.movie_info(cached.id).await,
    };

    match fresh.and_then(|payload| record_from_payload(&payload, Utc::now())) {
        Some(record) => {
            movies::upsert_movie(conn, &record)?;
            match movies::get_movie(conn, record.id)? {
                Some(materialized) => Ok(materialized),
                None => Ok(record),
            }
        }
        None => {
            warn!(
                id = cached.id,
                title = %cached.title,
                "error refreshing movie details, cached info being used"
            );
            Ok(cached)
        }
    }
}

/// Online resolution fallback chain: alias, then id, then free-text search.
/// Each step yields an empty result when it doesn't pan out; the first
/// persisted record short-circuits.
async fn resolve_from_provider(
    conn: &mut Connection,
    provider: &dyn MovieProvider,
    title: Option<&str>,
    year: Option<i32>,
    provider_id: Option<i64>,
    imdb_id: Option<&str>,
    search_string: Option<&str>,
) -> Result<Option<i64>> {
    let now = Utc::now();

    if let Some(imdb) = imdb_id {
        if let Some(payload) = provider.movie_alias(imdb, IMDB).await {
            let title_mismatch = matches!(
                (title, payload.title.as_deref()),
                (Some(want), Some(have)) if matcher::title_similarity(have, want) < matcher::MIN_MATCH
            );
            if title_mismatch {
                // The alias resolved to something else entirely; continue
                // as if no alias had been supplied
                debug!(imdb_id = imdb, "alias hit does not match the requested title, discarding");
            } else if let Some(record) = record_from_payload(&payload, now) {
                // The movie may already be cached without this alias
                // stored; the merge updates it either way
                movies::upsert_movie(conn, &record)?;
                return Ok(Some(record.id));
            }
        }
    }

    if let Some(id) = provider_id {
        if let Some(payload) = provider.movie_info(id).await {
            if let Some(record) = record_from_payload(&payload, now) {
                movies::upsert_movie(conn, &record)?;
                return Ok(Some(record.id));
            }
        }
    }

    if let (Some(title), Some(search)) = (title, search_string) {
        debug!(query = search, "searching provider");
        let hits = provider.search(search, None, None).await;
        if !hits.is_empty() {
            let winner = matcher::select_best(hits, title, year)?;

            // Full details: prefer the winner's imdb alias, then its id,
            // then fall back to the search hit payload itself
            let detail = match winner.payload.alternate_id(IMDB) {
                Some(imdb) => provider.movie_alias(imdb, IMDB).await,
                None => match winner.payload.id {
                    Some(id) => provider.movie_info(id).await,
                    None => None,
                },
            };
            let payload = detail.unwrap_or(winner.payload);

            if let Some(record) = record_from_payload(&payload, now) {
                movies::upsert_movie(conn, &record)?;
                if record.title.to_lowercase() != title.to_lowercase() {
                    // Future identical queries cannot match by title
                    // equality; remember the disambiguation
                    memos::remember_search(conn, search, record.id)?;
                }
                return Ok(Some(record.id));
            }
        }
    }

    Ok(None)
}

/// Explicit field-by-field mapping from a provider payload into the cache
/// model. `None` when the payload carries no usable id.
pub fn record_from_payload(payload: &MoviePayload, now: DateTime<Utc>) -> Option<MovieRecord> {
    let id = payload.id.filter(|&id| id != 0)?;
    let ratings = payload.ratings.clone().unwrap_or_default();

    Some(MovieRecord {
        id,
        title: payload.title.clone().unwrap_or_default(),
        year: payload.year,
        mpaa_rating: payload.mpaa_rating.clone(),
        runtime: payload.runtime,
        critics_consensus: payload.critics_consensus.clone(),
        critics_rating: ratings.critics_rating,
        critics_score: ratings.critics_score,
        audience_rating: ratings.audience_rating,
        audience_score: ratings.audience_score,
        synopsis: payload.synopsis.clone(),
        studio: payload.studio.clone(),
        updated_at: Some(now),
        genres: payload.genres.clone().unwrap_or_default(),
        cast: payload
            .abridged_cast
            .iter()
            .flatten()
            .filter_map(|person| person.name.clone())
            .collect(),
        directors: payload
            .abridged_directors
            .iter()
            .flatten()
            .filter_map(|person| person.name.clone())
            .collect(),
        release_dates: payload
            .release_dates
            .iter()
            .flatten()
            .map(|(name, date)| ReleaseDate {
                name: name.clone(),
                date: Some(date.clone()),
            })
            .collect(),
        posters: payload
            .posters
            .iter()
            .flatten()
            .map(|(name, url)| Poster {
                name: name.clone(),
                url: url.clone(),
            })
            .collect(),
        alternate_ids: payload
            .alternate_ids
            .iter()
            .flatten()
            .map(|(name, ext_id)| AlternateId {
                name: name.clone(),
                ext_id: ext_id.clone(),
            })
            .collect(),
        links: payload
            .links
            .iter()
            .flatten()
            .map(|(name, url)| Link {
                name: name.clone(),
                url: url.clone(),
            })
            .collect(),
    })
}
