//! Shared constants for end-to-end tests

/// How long to wait for a freshly spawned server to answer `/`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Seed handed to the frame manager so allocations repeat across runs
pub const ALLOCATION_SEED: u64 = 42;

pub const ALBUM_NAME: &str = "Summer";

pub const FRAMESET_NAME: &str = "Living room";
