//! Movie cache queries.
//!
//! Lookup operations (by id, by alternate id, by case-insensitive title) and
//! the transactional insert-or-merge that keeps owned collections in sync
//! with the latest provider payload.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use reelcache_common::{Error, Result};

use crate::models::{AlternateId, Link, MovieRecord, Poster, ReleaseDate};

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Insert a movie or merge it in place.
///
/// Scalar fields are overwritten. Every owned collection (release dates,
/// posters, alternate ids, links) and every join-table row is deleted and
/// rebuilt from `record` — replaced wholesale, never appended to. Shared
/// genre/actor/director rows are matched case-insensitively and created
/// lazily on first encounter; they are never deleted.
///
/// The whole merge runs in one transaction, so concurrent resolutions of
/// the same provider id converge on a single row.
pub fn upsert_movie(conn: &Connection, record: &MovieRecord) -> Result<()> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    tx.execute(
        "INSERT INTO movies (
            id, title, year, mpaa_rating, runtime, critics_consensus,
            critics_rating, critics_score, audience_rating, audience_score,
            synopsis, studio, updated_at
         ) VALUES (
            :id, :title, :year, :mpaa_rating, :runtime, :critics_consensus,
            :critics_rating, :critics_score, :audience_rating, :audience_score,
            :synopsis, :studio, :updated_at
         )
         ON CONFLICT(id) DO UPDATE SET
            title = :title,
            year = :year,
            mpaa_rating = :mpaa_rating,
            runtime = :runtime,
            critics_consensus = :critics_consensus,
            critics_rating = :critics_rating,
            critics_score = :critics_score,
            audience_rating = :audience_rating,
            audience_score = :audience_score,
            synopsis = :synopsis,
            studio = :studio,
            updated_at = :updated_at",
        rusqlite::named_params! {
            ":id": record.id,
            ":title": &record.title,
            ":year": record.year,
            ":mpaa_rating": &record.mpaa_rating,
            ":runtime": record.runtime,
            ":critics_consensus": &record.critics_consensus,
            ":critics_rating": &record.critics_rating,
            ":critics_score": record.critics_score,
            ":audience_rating": &record.audience_rating,
            ":audience_score": record.audience_score,
            ":synopsis": &record.synopsis,
            ":studio": &record.studio,
            ":updated_at": record.updated_at.map(|t| t.to_rfc3339()),
        },
    )
    .map_err(db_err)?;

    // Replace, never append: wipe owned rows and join rows before rebuild
    for table in [
        "movie_genres",
        "movie_actors",
        "movie_directors",
        "release_dates",
        "posters",
        "alternate_ids",
        "links",
    ] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE movie_id = ?"),
            [record.id],
        )
        .map_err(db_err)?;
    }

    for name in &record.genres {
        let genre_id = get_or_create_reference(&tx, "genres", name)?;
        tx.execute(
            "INSERT OR IGNORE INTO movie_genres (movie_id, genre_id) VALUES (?, ?)",
            rusqlite::params![record.id, genre_id],
        )
        .map_err(db_err)?;
    }
    for name in &record.cast {
        let actor_id = get_or_create_reference(&tx, "actors", name)?;
        tx.execute(
            "INSERT OR IGNORE INTO movie_actors (movie_id, actor_id) VALUES (?, ?)",
            rusqlite::params![record.id, actor_id],
        )
        .map_err(db_err)?;
    }
    for name in &record.directors {
        let director_id = get_or_create_reference(&tx, "directors", name)?;
        tx.execute(
            "INSERT OR IGNORE INTO movie_directors (movie_id, director_id) VALUES (?, ?)",
            rusqlite::params![record.id, director_id],
        )
        .map_err(db_err)?;
    }

    for rd in &record.release_dates {
        tx.execute(
            "INSERT INTO release_dates (movie_id, name, date) VALUES (?, ?, ?)",
            rusqlite::params![record.id, &rd.name, &rd.date],
        )
        .map_err(db_err)?;
    }
    for poster in &record.posters {
        tx.execute(
            "INSERT INTO posters (movie_id, name, url) VALUES (?, ?, ?)",
            rusqlite::params![record.id, &poster.name, &poster.url],
        )
        .map_err(db_err)?;
    }
    for alt in &record.alternate_ids {
        tx.execute(
            "INSERT INTO alternate_ids (movie_id, name, ext_id) VALUES (?, ?, ?)",
            rusqlite::params![record.id, &alt.name, &alt.ext_id],
        )
        .map_err(db_err)?;
    }
    for link in &record.links {
        tx.execute(
            "INSERT INTO links (movie_id, name, url) VALUES (?, ?, ?)",
            rusqlite::params![record.id, &link.name, &link.url],
        )
        .map_err(db_err)?;
    }

    tx.commit().map_err(db_err)
}

/// Find a shared reference row by case-insensitive name, creating it if
/// missing. Valid for the `genres`, `actors` and `directors` tables.
fn get_or_create_reference(conn: &Connection, table: &str, name: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(&format!("SELECT id FROM {table} WHERE name = ?"), [name], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db_err)?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(&format!("INSERT INTO {table} (name) VALUES (?)"), [name])
        .map_err(db_err)?;
    Ok(conn.last_insert_rowid())
}

/// Load a fully materialized movie snapshot by provider id.
///
/// All owned collections and reference names are loaded eagerly; the
/// returned record has no dependency on the connection.
pub fn get_movie(conn: &Connection, id: i64) -> Result<Option<MovieRecord>> {
    let row = conn
        .query_row(
            "SELECT id, title, year, mpaa_rating, runtime, critics_consensus,
                    critics_rating, critics_score, audience_rating, audience_score,
                    synopsis, studio, updated_at
             FROM movies WHERE id = ?",
            [id],
            parse_movie_row,
        )
        .optional()
        .map_err(db_err)?;

    let mut record = match row {
        Some(record) => record,
        None => return Ok(None),
    };

    record.genres = load_reference_names(conn, "movie_genres", "genres", "genre_id", id)?;
    record.cast = load_reference_names(conn, "movie_actors", "actors", "actor_id", id)?;
    record.directors =
        load_reference_names(conn, "movie_directors", "directors", "director_id", id)?;

    record.release_dates = collect_rows(
        conn,
        "SELECT name, date FROM release_dates WHERE movie_id = ? ORDER BY id",
        id,
        |row| {
            Ok(ReleaseDate {
                name: row.get(0)?,
                date: row.get(1)?,
            })
        },
    )?;
    record.posters = collect_rows(
        conn,
        "SELECT name, url FROM posters WHERE movie_id = ? ORDER BY id",
        id,
        |row| {
            Ok(Poster {
                name: row.get(0)?,
                url: row.get(1)?,
            })
        },
    )?;
    record.alternate_ids = collect_rows(
        conn,
        "SELECT name, ext_id FROM alternate_ids WHERE movie_id = ? ORDER BY id",
        id,
        |row| {
            Ok(AlternateId {
                name: row.get(0)?,
                ext_id: row.get(1)?,
            })
        },
    )?;
    record.links = collect_rows(
        conn,
        "SELECT name, url FROM links WHERE movie_id = ? ORDER BY id",
        id,
        |row| {
            Ok(Link {
                name: row.get(0)?,
                url: row.get(1)?,
            })
        },
    )?;

    Ok(Some(record))
}

/// Resolve an alternate id within a namespace to its owning movie id,
/// e.g. (`"imdb"`, `"1049413"`).
pub fn find_id_by_alternate(
    conn: &Connection,
    namespace: &str,
    ext_id: &str,
) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT movie_id FROM alternate_ids WHERE name = ? AND ext_id = ? LIMIT 1",
        [namespace, ext_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(db_err)
}

/// Case-insensitive exact title lookup, optionally narrowed by year.
pub fn find_id_by_title(conn: &Connection, title: &str, year: Option<i32>) -> Result<Option<i64>> {
    match year {
        Some(year) => conn
            .query_row(
                "SELECT id FROM movies WHERE title = ? COLLATE NOCASE AND year = ? LIMIT 1",
                rusqlite::params![title, year],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err),
        None => conn
            .query_row(
                "SELECT id FROM movies WHERE title = ? COLLATE NOCASE LIMIT 1",
                [title],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err),
    }
}

fn parse_movie_row(row: &rusqlite::Row) -> rusqlite::Result<MovieRecord> {
    let updated_at: Option<String> = row.get(12)?;
    Ok(MovieRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        mpaa_rating: row.get(3)?,
        runtime: row.get(4)?,
        critics_consensus: row.get(5)?,
        critics_rating: row.get(6)?,
        critics_score: row.get(7)?,
        audience_rating: row.get(8)?,
        audience_score: row.get(9)?,
        synopsis: row.get(10)?,
        studio: row.get(11)?,
        updated_at: updated_at.and_then(parse_timestamp),
        ..Default::default()
    })
}

fn parse_timestamp(raw: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn load_reference_names(
    conn: &Connection,
    join_table: &str,
    ref_table: &str,
    ref_column: &str,
    movie_id: i64,
) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT r.name FROM {join_table} j
         JOIN {ref_table} r ON r.id = j.{ref_column}
         WHERE j.movie_id = ? ORDER BY j.rowid"
    );
    collect_rows(conn, &sql, movie_id, |row| row.get(0))
}

fn collect_rows<T>(
    conn: &Connection,
    sql: &str,
    movie_id: i64,
    map: impl Fn(&rusqlite::Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql).map_err(db_err)?;
    let rows = stmt.query_map([movie_id], map).map_err(db_err)?;
    rows.collect::<rusqlite::Result<Vec<T>>>().map_err(db_err)
}
