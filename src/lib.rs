//! Photo frame server library
//!
//! This library exposes the internal modules for testing and for the admin CLI.

pub mod config;
pub mod frame_store;
pub mod notifications;
pub mod photoframes;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use frame_store::{SqliteFrameStore, StoreError};
pub use notifications::{EtcdSink, NoOpSink, NotificationSink, RecordingSink};
pub use photoframes::FrameManager;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
