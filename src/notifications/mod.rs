//! Delivery of per-frame messages (playlists, settings, commands) to the devices.

mod etcd;
mod sink;

pub use etcd::EtcdSink;
pub use sink::{NoOpSink, Notification, NotificationSink, RecordingSink, Topic};
