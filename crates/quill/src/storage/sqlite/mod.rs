//! SQLite storage backend implementation.
//!
//! This module provides the relational implementation of `ItemRepository`
//! using `rusqlite` for synchronous operations and `tokio-rusqlite` for async
//! wrapping. Every collection shares one `items` table keyed by
//! `(collection, pk, sk)` with the item stored as a JSON body.

mod conversions;
mod error;
mod repository;
mod schema;

use tokio_rusqlite::Connection;

use quill_core::blog::Collection;
use quill_core::storage::{RepositoryError, Result};

pub use repository::SqliteRepository;

use error::wrap_err;

/// A shared SQLite connection that hands out per-collection repositories.
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Opens a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::Transient(format!("Cannot open database: {e}")))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Opens an in-memory database. Data is lost when the last clone is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::Transient(format!("Cannot open database: {e}")))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::Transient(e.to_string()))
    }

    pub fn repository(&self, collection: Collection) -> SqliteRepository {
        SqliteRepository::new(self.conn.clone(), collection)
    }
}
