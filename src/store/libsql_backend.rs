//! libSQL-backed `SessionStore` implementation.
//!
//! Supports local file and in-memory databases. The snapshot lives in a
//! single-row table and is replaced atomically on every save.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::session::SessionSnapshot;
use crate::store::traits::SessionStore;

/// libSQL session store.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Session store opened");
        Ok(store)
    }

    /// Create an in-memory store (for tests).
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StorageError::Open(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS session (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    payload TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StorageError::Query(format!("init_schema: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for LibSqlStore {
    async fn save_session(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO session (id, payload, updated_at) VALUES (1, ?1, ?2)
                 ON CONFLICT (id) DO UPDATE SET payload = ?1, updated_at = ?2",
                params![payload, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StorageError::Query(format!("save_session: {e}")))?;

        debug!("Session snapshot saved");
        Ok(())
    }

    async fn load_session(&self) -> Result<Option<SessionSnapshot>, StorageError> {
        let mut rows = self
            .conn
            .query("SELECT payload FROM session WHERE id = 1", ())
            .await
            .map_err(|e| StorageError::Query(format!("load_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let payload: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("load_session row: {e}")))?;
                let snapshot = serde_json::from_str(&payload)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(Some(snapshot))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("load_session: {e}"))),
        }
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM session WHERE id = 1", ())
            .await
            .map_err(|e| StorageError::Query(format!("clear_session: {e}")))?;

        debug!("Session snapshot cleared");
        Ok(())
    }
}
