//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Handles pool initialization,
//! per-connection setup, and running migrations.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use filmradar_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite database file if it does not exist, enables foreign
/// key constraints on every connection, and runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use filmradar_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/filmradar/filmradar.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        // Enable foreign key constraints on each new connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

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

/// Initialize an in-memory database pool for testing.
///
/// The database is lost when the pool is dropped.
///
/// # Example
///
/// ```
/// use filmradar_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    // A named shared-cache database: every connection in this pool sees the
    // same tables, while separate pools stay isolated from each other.
    let uri = format!(
        "file:memdb-{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let manager = SqliteConnectionManager::file(uri).with_init(|conn| {
        // Enable foreign key constraints on each new connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool, converting the r2d2 error into our common
/// Error type.
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
        assert_eq!(pool.max_size(), 4);
    }

    #[test]
    fn test_get_conn() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        // Verify foreign keys are enabled
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
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('movies', 'episodes')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_pool_reuses_connections() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO movies (id, title, kind, source_quality_score, genres, last_checked, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, datetime('now'), datetime('now'), datetime('now'))",
                rusqlite::params!["test-id", "Test Movie", "movie", 50, "[]"],
            )
            .unwrap();
        }

        let conn = get_conn(&pool).unwrap();
        let title: String = conn
            .query_row("SELECT title FROM movies WHERE id = ?", ["test-id"], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, "Test Movie");
    }
}
