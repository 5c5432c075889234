//! Common test infrastructure for end-to-end tests
//!
//! Spawns a real server on a random port backed by a temporary database and
//! a recording notification sink.

pub mod client;
pub mod constants;
pub mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;
