use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Names of the images the frame should cycle through.
    Images,
    Settings,
    ChangePhoto,
    Reboot,
    RestartScreen,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Images => "images",
            Topic::Settings => "settings",
            Topic::ChangePhoto => "change_photo",
            Topic::Reboot => "reboot",
            Topic::RestartScreen => "restart_screen",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub target_id: String,
    pub topic: Topic,
    pub payload: Value,
}

/// Fire-and-forget channel to the frames.
///
/// Implementations must not block the caller on delivery and must never fail it:
/// delivery problems are logged and dropped.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, target_id: &str, topic: Topic, payload: Value);
}

pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn publish(&self, target_id: &str, topic: Topic, _payload: Value) {
        debug!("Dropping {} notification for frame {}", topic, target_id);
    }
}

/// Keeps every published notification in memory.
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }

    /// Most recent payload sent to `target_id` on `topic`.
    pub fn last(&self, target_id: &str, topic: Topic) -> Option<Value> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|n| n.target_id == target_id && n.topic == topic)
            .map(|n| n.payload.clone())
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, target_id: &str, topic: Topic, payload: Value) {
        self.published.lock().unwrap().push(Notification {
            target_id: target_id.to_string(),
            topic,
            payload,
        });
    }
}
