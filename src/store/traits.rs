//! Async interface for snapshot persistence.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::session::SessionSnapshot;

/// Backend-agnostic durable storage for the session snapshot.
///
/// The snapshot is written at step boundaries, read back by the
/// feedback submission and the reconciler, and cleared in full after a
/// successful feedback submission.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write the snapshot, replacing any previous one.
    async fn save_session(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError>;

    /// Read the snapshot back, if one exists.
    async fn load_session(&self) -> Result<Option<SessionSnapshot>, StorageError>;

    /// Remove the stored snapshot entirely.
    async fn clear_session(&self) -> Result<(), StorageError>;
}
