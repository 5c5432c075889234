use super::album::{self, AlbumSummary, AlbumUpdate};
use super::frame::{self, FrameSettingsUpdate, FrameStatus, FrameSummary, Registration};
use super::frameset::{self, FramesetSummary, FramesetUpdate};
use super::image::{self, ImageQuery, ImageUpdate, NewImage};
use super::outbox::Outbox;
use super::MembershipChange;
use crate::frame_store::{
    record, Album, Frame, Frameset, Image, Orientation, SqliteFrameStore, StoreResult,
};
use crate::notifications::{NotificationSink, Topic};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Entry point for every photo frame operation.
///
/// Each mutation runs inside one store transaction. Notifications it produces are
/// published after the commit; a failed operation publishes nothing.
pub struct FrameManager {
    store: SqliteFrameStore,
    sink: Arc<dyn NotificationSink>,
    rng: Mutex<StdRng>,
}

impl FrameManager {
    /// `seed` fixes every random allocation decision, for reproducible runs.
    pub fn new(store: SqliteFrameStore, sink: Arc<dyn NotificationSink>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => {
                info!("Using allocation seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        Self {
            store,
            sink,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &SqliteFrameStore {
        &self.store
    }

    fn read<T>(&self, op: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        self.store.read(op)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&Connection, &mut StdRng, &mut Outbox) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut rng = self.rng.lock().unwrap();
        let (out, notifications) = self.store.transaction(|conn| {
            let mut outbox = Outbox::new();
            let out = op(conn, &mut *rng, &mut outbox)?;
            Ok((out, outbox.resolve(conn)?))
        })?;
        drop(rng);

        if !notifications.is_empty() {
            debug!("Publishing {} notifications", notifications.len());
        }
        for notification in notifications {
            self.sink
                .publish(&notification.target_id, notification.topic, notification.payload);
        }
        Ok(out)
    }

    // Images

    pub fn create_image(&self, new: NewImage) -> StoreResult<Image> {
        self.mutate(|conn, _, _| image::create_image(conn, new))
    }

    pub fn get_image(&self, image_id: &str) -> StoreResult<Image> {
        self.read(|conn| image::get_image(conn, image_id))
    }

    pub fn list_images(&self, query: &ImageQuery) -> StoreResult<Vec<Image>> {
        self.read(|conn| image::list_images(conn, query))
    }

    pub fn update_image(&self, image_id: &str, update: ImageUpdate) -> StoreResult<Image> {
        self.mutate(|conn, _, outbox| image::update_image(conn, image_id, update, outbox))
    }

    pub fn delete_image(&self, image_id: &str) -> StoreResult<()> {
        self.mutate(|conn, rng, outbox| image::delete_image(conn, image_id, rng, outbox))
    }

    // Albums

    pub fn create_album(&self, name: &str, orientation: Orientation) -> StoreResult<Album> {
        self.mutate(|conn, _, _| album::create_album(conn, name, orientation))
    }

    pub fn get_album(&self, album_id: &str) -> StoreResult<AlbumSummary> {
        self.read(|conn| album::get_album(conn, album_id))
    }

    pub fn list_albums(&self, top_level_only: bool) -> StoreResult<Vec<AlbumSummary>> {
        self.read(|conn| album::list_albums(conn, top_level_only))
    }

    pub fn sub_albums(&self, parent_id: &str) -> StoreResult<Vec<AlbumSummary>> {
        self.read(|conn| {
            record::get::<Album>(conn, parent_id)?;
            album::sub_albums(conn, parent_id)
        })
    }

    pub fn album_images(&self, album_id: &str) -> StoreResult<Vec<Image>> {
        self.read(|conn| album::album_images(conn, album_id))
    }

    pub fn update_album(&self, album_id: &str, update: AlbumUpdate) -> StoreResult<Album> {
        self.mutate(|conn, _, _| album::update_album(conn, album_id, update))
    }

    pub fn add_image_to_album(&self, album_id: &str, image_id: &str) -> StoreResult<bool> {
        self.mutate(|conn, _, outbox| album::add_image(conn, album_id, image_id, outbox))
    }

    pub fn add_image_by_name(&self, album_name: &str, image_name: &str) -> StoreResult<AlbumSummary> {
        self.mutate(|conn, _, outbox| album::add_image_by_name(conn, album_name, image_name, outbox))
    }

    pub fn remove_image_from_album(&self, album_id: &str, image_id: &str) -> StoreResult<bool> {
        self.mutate(|conn, rng, outbox| album::remove_image(conn, album_id, image_id, rng, outbox))
    }

    pub fn update_album_images(
        &self,
        album_id: &str,
        selected: &[String],
    ) -> StoreResult<MembershipChange> {
        self.mutate(|conn, rng, outbox| album::update_images(conn, album_id, selected, rng, outbox))
    }

    pub fn delete_album(&self, album_id: &str) -> StoreResult<()> {
        self.mutate(|conn, _, outbox| album::delete_album(conn, album_id, outbox))
    }

    pub fn delete_albums_by_name(&self, name: &str) -> StoreResult<usize> {
        self.mutate(|conn, _, outbox| album::delete_albums_by_name(conn, name, outbox))
    }

    // Frames

    pub fn register_frame(
        &self,
        frame_id: &str,
        ip: Option<&str>,
        freespace: Option<i64>,
    ) -> StoreResult<Registration> {
        self.mutate(|conn, _, outbox| frame::register_frame(conn, frame_id, ip, freespace, outbox))
    }

    pub fn create_frame(&self, frame_id: Option<&str>, name: &str) -> StoreResult<Frame> {
        self.mutate(|conn, _, outbox| frame::create_frame(conn, frame_id, name, outbox))
    }

    pub fn get_frame(&self, frame_id: &str) -> StoreResult<FrameSummary> {
        self.read(|conn| frame::get_frame(conn, frame_id))
    }

    pub fn list_frames(&self) -> StoreResult<Vec<FrameSummary>> {
        self.read(frame::list_frames)
    }

    pub fn frame_status(&self, frame_id: &str) -> StoreResult<FrameStatus> {
        self.read(|conn| frame::frame_status(conn, frame_id))
    }

    pub fn update_frame_settings(
        &self,
        frame_id: &str,
        update: FrameSettingsUpdate,
    ) -> StoreResult<Frame> {
        self.mutate(|conn, _, outbox| frame::update_frame_settings(conn, frame_id, update, outbox))
    }

    pub fn set_frame_album(&self, frame_id: &str, album_id: Option<&str>) -> StoreResult<Frame> {
        self.mutate(|conn, _, outbox| frame::set_frame_album(conn, frame_id, album_id, outbox))
    }

    pub fn delete_frame(&self, frame_id: &str) -> StoreResult<()> {
        self.mutate(|conn, rng, outbox| frame::delete_frame(conn, frame_id, rng, outbox))
    }

    /// Asks a frame to move through its playlist, e.g. `"next"` or `"prev"`.
    pub fn navigate(&self, frame_id: &str, direction: &str) -> StoreResult<()> {
        self.command(frame_id, Topic::ChangePhoto, direction)
    }

    pub fn reboot(&self, frame_id: &str) -> StoreResult<()> {
        self.command(frame_id, Topic::Reboot, "now")
    }

    pub fn restart_screen(&self, frame_id: &str) -> StoreResult<()> {
        self.command(frame_id, Topic::RestartScreen, "now")
    }

    fn command(&self, frame_id: &str, topic: Topic, value: &str) -> StoreResult<()> {
        self.mutate(|conn, _, outbox| {
            record::get::<Frame>(conn, frame_id)?;
            outbox.command(frame_id, topic, json!(value));
            Ok(())
        })?;
        info!("Sent {} to frame {}", topic, frame_id);
        Ok(())
    }

    // Framesets

    pub fn create_frameset(&self, name: &str, orientation: Orientation) -> StoreResult<Frameset> {
        self.mutate(|conn, _, _| frameset::create_frameset(conn, name, orientation))
    }

    pub fn get_frameset(&self, frameset_id: &str) -> StoreResult<FramesetSummary> {
        self.read(|conn| frameset::get_frameset(conn, frameset_id))
    }

    pub fn list_framesets(&self, orientation: Option<Orientation>) -> StoreResult<Vec<FramesetSummary>> {
        self.read(|conn| frameset::list_framesets(conn, orientation))
    }

    pub fn frameset_members(&self, frameset_id: &str) -> StoreResult<Vec<Frame>> {
        self.read(|conn| {
            record::get::<Frameset>(conn, frameset_id)?;
            frameset::member_frames(conn, frameset_id)
        })
    }

    pub fn update_frameset(&self, frameset_id: &str, update: FramesetUpdate) -> StoreResult<Frameset> {
        self.mutate(|conn, _, _| frameset::update_frameset(conn, frameset_id, update))
    }

    pub fn assign_frames(&self, frameset_id: &str, frame_ids: &[String]) -> StoreResult<Vec<Frame>> {
        self.mutate(|conn, rng, outbox| {
            frameset::assign_frames(conn, frameset_id, frame_ids, rng, outbox)
        })
    }

    pub fn assign_album(&self, frameset_id: &str, album_id: Option<&str>) -> StoreResult<Vec<Album>> {
        self.mutate(|conn, rng, outbox| {
            frameset::assign_album(conn, frameset_id, album_id, rng, outbox)
        })
    }

    pub fn delete_frameset(&self, frameset_id: &str) -> StoreResult<()> {
        self.mutate(|conn, _, outbox| frameset::delete_frameset(conn, frameset_id, outbox))
    }
}
