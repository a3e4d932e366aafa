//! Reelcache - movie metadata resolution and caching engine.
//!
//! Resolves a movie identified by loose criteria (title, year, provider id,
//! imdb id, or a free-text guess) against a Rotten Tomatoes-style metadata
//! API and caches the resolved record in SQLite so repeated lookups avoid
//! network round-trips and repeat disambiguation.

pub mod config;
pub mod lookup;
pub mod matcher;
pub mod provider;
pub mod titles;
