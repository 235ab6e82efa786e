//! SQLite storage for the filmradar catalog.
//!
//! Provides the connection pool, embedded schema migrations, row models, and
//! query modules for the `movies` and `episodes` tables.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
