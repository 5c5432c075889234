use super::outbox::Outbox;
use crate::frame_store::{
    membership, record, Album, FrameLogLevel, Frame, Frameset, IntervalUnits, Orientation,
    StoreError, StoreResult,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Image names a frame should display, empty when it has no album.
pub fn playlist(conn: &Connection, frame: &Frame) -> StoreResult<Vec<String>> {
    match &frame.album_id {
        Some(album_id) => membership::image_names(conn, album_id),
        None => Ok(Vec::new()),
    }
}

/// The settings a frame pulls from its `settings` key.
pub fn settings_payload(frame: &Frame) -> Value {
    json!({
        "name": frame.name,
        "description": frame.description,
        "orientation": frame.orientation,
        "interval_time": frame.interval_time,
        "interval_units": frame.interval_units,
        "variance_pct": frame.variance_pct,
        "brightness": frame.brightness,
        "contrast": frame.contrast,
        "saturation": frame.saturation,
        "log_level": frame.log_level,
    })
}

/// Points a frame at `album_id` without any ownership checks.
pub(crate) fn point_at_album(
    conn: &Connection,
    frame_id: &str,
    album_id: Option<&str>,
    outbox: &mut Outbox,
) -> StoreResult<()> {
    record::update_fields::<Frame>(conn, frame_id, &[("album_id", record::opt_text(album_id))])?;
    outbox.frame_rebound(frame_id);
    Ok(())
}

/// Sets the album of a standalone frame.
///
/// Frames in a frameset get their album from the frameset's allocation, and
/// sub-albums belong to the frame they were split for, so both are refused.
pub fn set_frame_album(
    conn: &Connection,
    frame_id: &str,
    album_id: Option<&str>,
    outbox: &mut Outbox,
) -> StoreResult<Frame> {
    let frame: Frame = record::get(conn, frame_id)?;
    if let Some(frameset_id) = frame.frameset_id {
        return Err(StoreError::FrameManagedByFrameset {
            frame_id: frame.id,
            frameset_id,
        });
    }
    if let Some(album_id) = album_id {
        let album: Album = record::get(conn, album_id)?;
        if album.is_sub_album() {
            return Err(StoreError::SubAlbumNotSplittable(album.id));
        }
    }
    point_at_album(conn, frame_id, album_id, outbox)?;
    record::get(conn, frame_id)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub frame_id: String,
    pub images: Vec<String>,
}

/// First contact from a device, or a periodic check-in.
///
/// Unknown ids are created; a create that races with an existing row falls back
/// to updating it.
pub fn register_frame(
    conn: &Connection,
    frame_id: &str,
    ip: Option<&str>,
    freespace: Option<i64>,
    outbox: &mut Outbox,
) -> StoreResult<Registration> {
    let mut frame = match record::find::<Frame>(conn, frame_id)? {
        Some(frame) => frame,
        None => {
            info!("Registering new frame {}", frame_id);
            Frame::new(frame_id)
        }
    };
    if let Some(ip) = ip {
        frame.ip = Some(ip.to_string());
    }
    if let Some(freespace) = freespace {
        frame.freespace = freespace;
    }
    record::save(conn, &frame)?;
    outbox.settings_changed(frame_id);

    Ok(Registration {
        frame_id: frame.id.clone(),
        images: playlist(conn, &frame)?,
    })
}

pub fn create_frame(
    conn: &Connection,
    frame_id: Option<&str>,
    name: &str,
    outbox: &mut Outbox,
) -> StoreResult<Frame> {
    let mut frame = Frame::new(frame_id.map(str::to_string).unwrap_or_else(crate::frame_store::new_id));
    frame.name = name.to_string();
    record::insert(conn, &frame)?;
    outbox.settings_changed(&frame.id);
    Ok(frame)
}

/// Partial update of the user-editable frame settings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrameSettingsUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub orientation: Option<Orientation>,
    pub interval_time: Option<u32>,
    pub interval_units: Option<IntervalUnits>,
    pub variance_pct: Option<u32>,
    pub shutdown: Option<bool>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub log_level: Option<FrameLogLevel>,
}

impl FrameSettingsUpdate {
    fn apply(self, frame: &mut Frame) {
        if let Some(name) = self.name {
            frame.name = name;
        }
        if let Some(description) = self.description {
            frame.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(orientation) = self.orientation {
            frame.orientation = orientation;
        }
        if let Some(interval_time) = self.interval_time {
            frame.interval_time = interval_time;
        }
        if let Some(interval_units) = self.interval_units {
            frame.interval_units = interval_units;
        }
        if let Some(variance_pct) = self.variance_pct {
            frame.variance_pct = variance_pct;
        }
        if let Some(shutdown) = self.shutdown {
            frame.shutdown = shutdown;
        }
        if let Some(brightness) = self.brightness {
            frame.brightness = brightness;
        }
        if let Some(contrast) = self.contrast {
            frame.contrast = contrast;
        }
        if let Some(saturation) = self.saturation {
            frame.saturation = saturation;
        }
        if let Some(log_level) = self.log_level {
            frame.log_level = log_level;
        }
    }
}

pub fn update_frame_settings(
    conn: &Connection,
    frame_id: &str,
    update: FrameSettingsUpdate,
    outbox: &mut Outbox,
) -> StoreResult<Frame> {
    let mut frame: Frame = record::get(conn, frame_id)?;
    update.apply(&mut frame);
    record::update(conn, &frame)?;
    outbox.settings_changed(frame_id);
    record::get(conn, frame_id)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameStatus {
    pub settings: Value,
    pub images: Vec<String>,
}

pub fn frame_status(conn: &Connection, frame_id: &str) -> StoreResult<FrameStatus> {
    let frame: Frame = record::get(conn, frame_id)?;
    Ok(FrameStatus {
        settings: settings_payload(&frame),
        images: playlist(conn, &frame)?,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSummary {
    #[serde(flatten)]
    pub frame: Frame,
    pub frameset_name: Option<String>,
    pub freespace_display: String,
}

fn summarize(conn: &Connection, frame: Frame) -> StoreResult<FrameSummary> {
    let frameset_name = match &frame.frameset_id {
        Some(id) => record::find::<Frameset>(conn, id)?.map(|fs| fs.name),
        None => None,
    };
    let freespace_display = format!("{:#}", byte_unit::Byte::from(frame.freespace.max(0) as usize));
    Ok(FrameSummary {
        frame,
        frameset_name,
        freespace_display,
    })
}

pub fn get_frame(conn: &Connection, frame_id: &str) -> StoreResult<FrameSummary> {
    let frame: Frame = record::get(conn, frame_id)?;
    summarize(conn, frame)
}

pub fn list_frames(conn: &Connection) -> StoreResult<Vec<FrameSummary>> {
    let frames: Vec<Frame> = record::list(conn, &record::Filter::new().order_by("name"))?;
    frames.into_iter().map(|f| summarize(conn, f)).collect()
}

/// Deletes a frame. A frameset member is first taken out of its frameset, which
/// re-splits the frameset's album over the remaining members.
pub fn delete_frame<R: rand::Rng + ?Sized>(
    conn: &Connection,
    frame_id: &str,
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<()> {
    let frame: Frame = record::get(conn, frame_id)?;
    if let Some(frameset_id) = &frame.frameset_id {
        let remaining: Vec<String> = super::frameset::member_frames(conn, frameset_id)?
            .into_iter()
            .map(|f| f.id)
            .filter(|id| id != frame_id)
            .collect();
        super::frameset::assign_frames(conn, frameset_id, &remaining, rng, outbox)?;
    }
    record::delete::<Frame>(conn, frame_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_store::SqliteFrameStore;
    use crate::notifications::Topic;
    use crate::photoframes::testing::*;

    #[test]
    fn register_creates_then_updates() {
        let store = SqliteFrameStore::in_memory().unwrap();
        store
            .transaction(|conn| {
                let mut outbox = Outbox::new();
                let reg = register_frame(conn, "dev-1", Some("10.0.0.2"), Some(5000), &mut outbox)?;
                assert_eq!(reg.frame_id, "dev-1");
                assert!(reg.images.is_empty());
                let notes = outbox.resolve(conn)?;
                assert_eq!(notes.len(), 1);
                assert_eq!(notes[0].topic, Topic::Settings);
                assert_eq!(notes[0].payload["name"], Frame::DEFAULT_NAME);

                register_frame(conn, "dev-1", Some("10.0.0.3"), None, &mut Outbox::new())?;
                let frame: Frame = record::get(conn, "dev-1")?;
                assert_eq!(frame.ip.as_deref(), Some("10.0.0.3"));
                assert_eq!(frame.freespace, 5000);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn registration_returns_current_playlist() {
        let store = SqliteFrameStore::in_memory().unwrap();
        store
            .transaction(|conn| {
                let (album, _) = seed_album(conn, "wall", 2)?;
                let frames = seed_frames(conn, 1)?;
                set_frame_album(conn, &frames[0].id, Some(album.id.as_str()), &mut Outbox::new())?;

                let reg = register_frame(conn, &frames[0].id, None, None, &mut Outbox::new())?;
                assert_eq!(reg.images, vec!["wall-000.jpg", "wall-001.jpg"]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn settings_update_is_partial_and_notifies() {
        let store = SqliteFrameStore::in_memory().unwrap();
        store
            .transaction(|conn| {
                let frame = create_frame(conn, Some("f1"), "Hall", &mut Outbox::new())?;
                let mut outbox = Outbox::new();
                let updated = update_frame_settings(
                    conn,
                    &frame.id,
                    FrameSettingsUpdate {
                        brightness: Some(0.8),
                        interval_units: Some(IntervalUnits::Minutes),
                        ..Default::default()
                    },
                    &mut outbox,
                )?;
                assert_eq!(updated.name, "Hall");
                assert_eq!(updated.brightness, 0.8);
                assert_eq!(updated.interval_units, IntervalUnits::Minutes);

                let notes = outbox.resolve(conn)?;
                assert_eq!(notes.len(), 1);
                assert_eq!(notes[0].payload["interval_units"], "minutes");
                assert_eq!(notes[0].payload["brightness"], 0.8);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn status_reports_settings_and_images() {
        let store = SqliteFrameStore::in_memory().unwrap();
        store
            .transaction(|conn| {
                let (album, _) = seed_album(conn, "a", 3)?;
                let frame = create_frame(conn, Some("f1"), "Desk", &mut Outbox::new())?;
                set_frame_album(conn, &frame.id, Some(album.id.as_str()), &mut Outbox::new())?;

                let status = frame_status(conn, "f1")?;
                assert_eq!(status.settings["name"], "Desk");
                assert_eq!(status.images.len(), 3);
                assert!(matches!(
                    frame_status(conn, "nope"),
                    Err(StoreError::NotFound { .. })
                ));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn standalone_album_binding_pushes_playlist() {
        let store = SqliteFrameStore::in_memory().unwrap();
        store
            .transaction(|conn| {
                let (album, _) = seed_album(conn, "a", 2)?;
                let frames = seed_frames(conn, 1)?;
                let mut outbox = Outbox::new();
                let frame = set_frame_album(conn, &frames[0].id, Some(album.id.as_str()), &mut outbox)?;
                assert_eq!(frame.album_id.as_deref(), Some(album.id.as_str()));

                let notes = outbox.resolve(conn)?;
                assert_eq!(notes.len(), 1);
                assert_eq!(notes[0].topic, Topic::Images);
                assert_eq!(notes[0].payload, json!(["a-000.jpg", "a-001.jpg"]));

                let mut outbox = Outbox::new();
                set_frame_album(conn, &frames[0].id, None, &mut outbox)?;
                let notes = outbox.resolve(conn)?;
                assert_eq!(notes[0].payload, json!([]));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn frameset_members_cannot_pick_their_own_album() {
        let store = SqliteFrameStore::in_memory().unwrap();
        let err = store
            .transaction(|conn| {
                let (album, _) = seed_album(conn, "a", 1)?;
                let frames = seed_frames(conn, 1)?;
                record::update_fields::<Frame>(
                    conn,
                    &frames[0].id,
                    &[("frameset_id", record::text("fs-1"))],
                )?;
                set_frame_album(conn, &frames[0].id, Some(album.id.as_str()), &mut Outbox::new())
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::FrameManagedByFrameset { .. }));
    }

    #[test]
    fn list_frames_includes_display_fields() {
        let store = SqliteFrameStore::in_memory().unwrap();
        store
            .transaction(|conn| {
                create_frame(conn, Some("b"), "Bedroom", &mut Outbox::new())?;
                create_frame(conn, Some("a"), "Attic", &mut Outbox::new())?;
                let frames = list_frames(conn)?;
                let names: Vec<_> = frames.iter().map(|f| f.frame.name.as_str()).collect();
                assert_eq!(names, vec!["Attic", "Bedroom"]);
                assert!(frames[0].frameset_name.is_none());
                assert!(!frames[0].freespace_display.is_empty());
                Ok(())
            })
            .unwrap();
    }
}
