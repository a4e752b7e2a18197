use crate::errors::StorageError;
use std::fmt::{self, Debug};
use turso::Database;

mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance, which manages a connection pool.
/// When cloned, it shares the same underlying database, allowing concurrent
/// access to the same database file or in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a
    ///   unique, isolated in-memory database. To share an in-memory database
    ///   across multiple `SqliteProvider` instances (e.g., in tests), create
    ///   one provider and then `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, StorageError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Enable WAL mode for better concurrency on file-based databases.
        // It has no effect on in-memory databases but is safe to run.
        let conn = db
            .connect()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        // Use `query` for PRAGMA statements that return a value to avoid
        // "unexpected row" errors.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Ensures that all required application tables and indexes exist.
    /// This function is idempotent and safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), StorageError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}