//! Framesets own their members' albums: a member is `bound` while the frameset
//! has no album and `allocated` to its own sub-album once one is assigned.

use super::allocation::{split_for_frameset, sub_album_name};
use super::frame::point_at_album;
use super::outbox::Outbox;
use crate::frame_store::{
    record, Album, Filter, Frame, Frameset, IntervalUnits, Orientation, StoreError, StoreResult,
};
use rand::Rng;
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FramesetSummary {
    #[serde(flatten)]
    pub frameset: Frameset,
    pub num_frames: usize,
}

fn summarize(conn: &Connection, frameset: Frameset) -> StoreResult<FramesetSummary> {
    let num_frames = record::count::<Frame>(
        conn,
        &Filter::new().eq("frameset_id", record::text(frameset.id.as_str())),
    )?;
    Ok(FramesetSummary {
        frameset,
        num_frames,
    })
}

pub fn create_frameset(conn: &Connection, name: &str, orientation: Orientation) -> StoreResult<Frameset> {
    let mut frameset = Frameset::new(name);
    frameset.orientation = orientation;
    record::insert(conn, &frameset)?;
    info!("Created frameset {} ({})", frameset.name, frameset.id);
    Ok(frameset)
}

pub fn get_frameset(conn: &Connection, frameset_id: &str) -> StoreResult<FramesetSummary> {
    let frameset: Frameset = record::get(conn, frameset_id)?;
    summarize(conn, frameset)
}

pub fn list_framesets(
    conn: &Connection,
    orientation: Option<Orientation>,
) -> StoreResult<Vec<FramesetSummary>> {
    let mut filter = Filter::new().order_by("name");
    if let Some(orientation) = orientation {
        filter = filter.eq("orientation", record::text(orientation.to_db_str()));
    }
    let framesets: Vec<Frameset> = record::list(conn, &filter)?;
    framesets.into_iter().map(|fs| summarize(conn, fs)).collect()
}

/// Member frames in id order, which is also the order sub-albums are dealt in.
pub fn member_frames(conn: &Connection, frameset_id: &str) -> StoreResult<Vec<Frame>> {
    record::list(
        conn,
        &Filter::new()
            .eq("frameset_id", record::text(frameset_id))
            .order_by("id"),
    )
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FramesetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub orientation: Option<Orientation>,
    pub interval_time: Option<u32>,
    pub interval_units: Option<IntervalUnits>,
    pub variance_pct: Option<u32>,
}

pub fn update_frameset(
    conn: &Connection,
    frameset_id: &str,
    update: FramesetUpdate,
) -> StoreResult<Frameset> {
    let mut frameset: Frameset = record::get(conn, frameset_id)?;
    if let Some(name) = update.name {
        frameset.name = name;
    }
    if let Some(description) = update.description {
        frameset.description = Some(description).filter(|d| !d.is_empty());
    }
    if let Some(orientation) = update.orientation {
        frameset.orientation = orientation;
    }
    if let Some(interval_time) = update.interval_time {
        frameset.interval_time = interval_time;
    }
    if let Some(interval_units) = update.interval_units {
        frameset.interval_units = interval_units;
    }
    if let Some(variance_pct) = update.variance_pct {
        frameset.variance_pct = variance_pct;
    }
    record::update(conn, &frameset)?;
    record::get(conn, frameset_id)
}

/// Deletes the sub-albums split from the frameset's current album, one per member,
/// and leaves the members without an album.
fn teardown_sub_albums(conn: &Connection, frameset: &Frameset, outbox: &mut Outbox) -> StoreResult<()> {
    let Some(parent) = frameset
        .album_id
        .as_deref()
        .map(|id| record::find::<Album>(conn, id))
        .transpose()?
        .flatten()
    else {
        return Ok(());
    };

    for frame in member_frames(conn, &frameset.id)? {
        let subs: Vec<Album> = record::list(
            conn,
            &Filter::new()
                .eq("name", record::text(sub_album_name(&parent.name, &frame.id)))
                .eq("parent_id", record::text(parent.id.as_str())),
        )?;
        for sub in subs {
            record::delete::<Album>(conn, &sub.id)?;
            debug!("Deleted sub-album {} of frame {}", sub.name, frame.id);
        }
        if frame.album_id.is_some() {
            point_at_album(conn, &frame.id, None, outbox)?;
        }
    }
    Ok(())
}

/// Replaces the frameset's members with `frame_ids`.
///
/// Every id is checked before anything changes: an unknown frame fails with
/// `NotFound` and a frame owned by another frameset with `DuplicateMembership`.
/// When the frameset has an album it is split again across the new members.
pub fn assign_frames<R: Rng + ?Sized>(
    conn: &Connection,
    frameset_id: &str,
    frame_ids: &[String],
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<Vec<Frame>> {
    let frameset: Frameset = record::get(conn, frameset_id)?;

    let mut incoming: Vec<Frame> = Vec::with_capacity(frame_ids.len());
    for frame_id in frame_ids {
        if incoming.iter().any(|f| &f.id == frame_id) {
            continue;
        }
        let frame: Frame = record::get(conn, frame_id)?;
        if let Some(other) = frame.frameset_id.as_deref().filter(|id| *id != frameset.id) {
            return Err(StoreError::DuplicateMembership {
                frame_id: frame.id,
                frameset_id: other.to_string(),
            });
        }
        incoming.push(frame);
    }

    teardown_sub_albums(conn, &frameset, outbox)?;
    for frame in member_frames(conn, &frameset.id)? {
        record::update_fields::<Frame>(
            conn,
            &frame.id,
            &[
                ("frameset_id", Value::Null),
                ("album_id", Value::Null),
            ],
        )?;
        outbox.frame_rebound(&frame.id);
    }

    for frame in &incoming {
        record::update_fields::<Frame>(
            conn,
            &frame.id,
            &[
                ("frameset_id", record::text(frameset.id.as_str())),
                ("album_id", Value::Null),
            ],
        )?;
        outbox.frame_rebound(&frame.id);
    }

    if let Some(album_id) = &frameset.album_id {
        let parent: Album = record::get(conn, album_id)?;
        let members = member_frames(conn, &frameset.id)?;
        split_for_frameset(conn, &parent, &members, rng, outbox)?;
    }
    info!(
        "Frameset {} now has {} frames",
        frameset.name,
        incoming.len()
    );
    member_frames(conn, &frameset.id)
}

/// Points the frameset at `album_id`, or at nothing, and re-splits.
///
/// Existing sub-albums are torn down first. Returns the sub-albums created.
pub fn assign_album<R: Rng + ?Sized>(
    conn: &Connection,
    frameset_id: &str,
    album_id: Option<&str>,
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<Vec<Album>> {
    let mut frameset: Frameset = record::get(conn, frameset_id)?;
    let parent = match album_id {
        Some(id) => {
            let album: Album = record::get(conn, id)?;
            if album.is_sub_album() {
                return Err(StoreError::SubAlbumNotSplittable(album.id));
            }
            // Sub-albums of one parent form a single pool, so only one frameset may split it.
            let holders: Vec<Frameset> =
                record::list(conn, &Filter::new().eq("album_id", record::text(album.id.as_str())))?;
            if let Some(other) = holders.into_iter().find(|fs| fs.id != frameset.id) {
                return Err(StoreError::AlbumAlreadySplit {
                    album_id: album.id,
                    frameset_id: other.id,
                });
            }
            Some(album)
        }
        None => None,
    };

    teardown_sub_albums(conn, &frameset, outbox)?;
    frameset.album_id = parent.as_ref().map(|a| a.id.clone());
    record::update(conn, &frameset)?;

    match parent {
        Some(parent) => {
            let members = member_frames(conn, &frameset.id)?;
            split_for_frameset(conn, &parent, &members, rng, outbox)
        }
        None => Ok(Vec::new()),
    }
}

/// Deletes a frameset. Its members go back to being standalone frames.
pub fn delete_frameset(conn: &Connection, frameset_id: &str, outbox: &mut Outbox) -> StoreResult<()> {
    let frameset: Frameset = record::get(conn, frameset_id)?;
    teardown_sub_albums(conn, &frameset, outbox)?;
    for frame in member_frames(conn, &frameset.id)? {
        outbox.frame_rebound(&frame.id);
    }
    record::delete::<Frameset>(conn, &frameset.id)?;
    info!("Deleted frameset {} ({})", frameset.name, frameset.id);
    Ok(())
}
