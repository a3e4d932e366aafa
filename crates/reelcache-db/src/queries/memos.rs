//! Remembered search strings.
//!
//! A memo maps a normalized search string (lowercased title, optionally
//! followed by the year) to the movie it disambiguated to. Written only when
//! the resolved title differs from the query, so an identical future query
//! can short-circuit straight to the record without re-running the matcher.

use rusqlite::{Connection, OptionalExtension};
use reelcache_common::{Error, Result};

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Remember that `search` resolved to `movie_id`.
///
/// Idempotent upsert on the search key: at most one memo exists per unique
/// search string, and a repeat write moves it to the new movie.
pub fn remember_search(conn: &Connection, search: &str, movie_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO search_memos (search, movie_id) VALUES (?, ?)
         ON CONFLICT(search) DO UPDATE SET movie_id = excluded.movie_id",
        rusqlite::params![search, movie_id],
    )
    .map_err(db_err)?;
    Ok(())
}

/// Exact-match lookup of a remembered search string.
pub fn find_memo(conn: &Connection, search: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT movie_id FROM search_memos WHERE search = ?",
        [search],
        |row| row.get(0),
    )
    .optional()
    .map_err(db_err)
}
