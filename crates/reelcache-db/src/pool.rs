//! Connection pooling for the movie cache.
//!
//! r2d2 over rusqlite. Every connection enables foreign keys (the owned
//! collections cascade with their movie) and sets a busy timeout so
//! concurrent resolutions queue on SQLite's single writer instead of
//! failing fast. Migrations run once at pool init; `init_memory_pool`
//! backs the test suites.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use reelcache_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initialize a new cache pool backed by the given file path.
///
/// Creates the SQLite file if it doesn't exist, enables foreign keys and a
/// busy timeout on every connection, and runs pending schema migrations.
///
/// # Example
///
/// ```no_run
/// use reelcache_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/reelcache/cache.sqlite").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        // Owned collections rely on cascade deletes; a second writer waits
        // for the transaction holding the write lock rather than erroring
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
    });

    build_pool(manager)
}

/// Initialize an in-memory cache pool for testing.
///
/// The database is lost when the pool is dropped. A single connection is
/// used so every test sees the same in-memory database.
///
/// # Example
///
/// ```
/// use reelcache_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool, converting the r2d2 error into the
/// common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='movies'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_pool_sets_busy_timeout() {
        let dir = std::env::temp_dir().join("reelcache-pool-test");
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join(format!("busy-{}.sqlite", std::process::id()));
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = init_pool(&db_path_str).unwrap();
        let conn = get_conn(&pool).unwrap();
        let timeout_ms: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout_ms, 5000);

        drop(conn);
        drop(pool);
        std::fs::remove_file(&db_path).ok();
    }

    #[test]
    fn test_file_pool_persists_across_connections() {
        let dir = std::env::temp_dir().join("reelcache-pool-test");
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join(format!("cache-{}.sqlite", std::process::id()));
        let db_path_str = db_path.to_string_lossy().to_string();

        {
            let pool = init_pool(&db_path_str).unwrap();
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO movies (id, title) VALUES (?, ?)",
                rusqlite::params![9, "Up"],
            )
            .unwrap();
        }

        let pool = init_pool(&db_path_str).unwrap();
        let conn = get_conn(&pool).unwrap();
        let title: String = conn
            .query_row("SELECT title FROM movies WHERE id = ?", [9], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, "Up");

        std::fs::remove_file(&db_path).ok();
    }
}
