//! toolscout: guided intake wizard core.
//!
//! Collects a problem description and profile, submits them to a remote
//! recommendation service, segments the free-form answer into
//! selectable tool suggestions, reconciles later updates from a session
//! feed, and routes the user through feedback and booking.

pub mod backend;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod segment;
pub mod selection;
pub mod session;
pub mod store;
pub mod wizard;
