//! Record store for images, albums, frames and framesets.

mod error;
pub mod membership;
mod models;
pub mod record;
mod records;
mod schema;
mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use record::{Filter, Record};
pub use schema::FRAME_VERSIONED_SCHEMAS;
pub use store::SqliteFrameStore;
