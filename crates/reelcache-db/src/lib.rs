//! Reelcache-DB: the persisted movie cache.
//!
//! SQLite via rusqlite with r2d2 connection pooling. The schema holds one
//! row per provider movie id plus its owned collections (release dates,
//! posters, alternate ids, links), shared reference tables for genres, cast
//! and directors, and remembered search strings that short-circuit repeat
//! disambiguation.
//!
//! # Modules
//!
//! - `migrations` - Embedded schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the cache schema
//! - `queries` - Cache lookup and mutation operations
//!
//! # Example
//!
//! ```no_run
//! use reelcache_db::pool::{init_pool, get_conn};
//! use reelcache_db::queries::movies;
//!
//! let pool = init_pool("/var/lib/reelcache/cache.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! if let Some(movie) = movies::get_movie(&conn, 770672122).unwrap() {
//!     println!("cached: {} ({:?})", movie.title, movie.year);
//! }
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
