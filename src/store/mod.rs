//! Persistence layer for durable session snapshots.

pub mod libsql_backend;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use traits::SessionStore;
