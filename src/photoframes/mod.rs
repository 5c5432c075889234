//! Albums, images, frames and framesets, and the allocation of a frameset's
//! album across its frames.
//!
//! The submodules hold the operations as plain functions over a connection;
//! [`FrameManager`] runs each one in a transaction and publishes what it owes
//! to the frames once the transaction commits.

pub mod album;
pub mod allocation;
pub mod frame;
pub mod frameset;
pub mod image;
mod manager;
pub mod outbox;
#[cfg(test)]
mod testing;

pub use manager::FrameManager;

use serde::Serialize;

/// Result of replacing an album's membership wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MembershipChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}
