use super::frame::{playlist, settings_payload};
use crate::frame_store::{record, Frame, StoreResult};
use crate::notifications::{Notification, Topic};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Notifications owed to frames by the mutation currently running.
///
/// Entities are only marked here; payloads are computed by [`Outbox::resolve`]
/// at the end of the transaction, so a frame touched several times receives its
/// final playlist once.
#[derive(Default, Debug)]
pub struct Outbox {
    albums: BTreeSet<String>,
    frames: BTreeSet<String>,
    settings: BTreeSet<String>,
    commands: Vec<Notification>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership of `album_id` changed: every frame showing it needs a new playlist.
    pub fn album_changed(&mut self, album_id: &str) {
        self.albums.insert(album_id.to_string());
    }

    /// `frame_id` now points at a different album, or none.
    pub fn frame_rebound(&mut self, frame_id: &str) {
        self.frames.insert(frame_id.to_string());
    }

    pub fn settings_changed(&mut self, frame_id: &str) {
        self.settings.insert(frame_id.to_string());
    }

    pub fn command(&mut self, frame_id: &str, topic: Topic, payload: Value) {
        self.commands.push(Notification {
            target_id: frame_id.to_string(),
            topic,
            payload,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
            && self.frames.is_empty()
            && self.settings.is_empty()
            && self.commands.is_empty()
    }

    pub fn resolve(self, conn: &Connection) -> StoreResult<Vec<Notification>> {
        let mut playlist_frames = self.frames;
        if !self.albums.is_empty() {
            let mut stmt = conn.prepare("SELECT id FROM frame WHERE album_id = ?1")?;
            for album_id in &self.albums {
                let ids = stmt
                    .query_map([album_id], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                playlist_frames.extend(ids);
            }
        }

        let mut notifications = Vec::new();
        for frame_id in &self.settings {
            // frames deleted later in the same transaction get nothing
            if let Some(frame) = record::find::<Frame>(conn, frame_id)? {
                notifications.push(Notification {
                    target_id: frame.id.clone(),
                    topic: Topic::Settings,
                    payload: settings_payload(&frame),
                });
            }
        }
        for frame_id in &playlist_frames {
            if let Some(frame) = record::find::<Frame>(conn, frame_id)? {
                notifications.push(Notification {
                    target_id: frame.id.clone(),
                    topic: Topic::Images,
                    payload: json!(playlist(conn, &frame)?),
                });
            }
        }
        notifications.extend(self.commands);
        Ok(notifications)
    }
}
