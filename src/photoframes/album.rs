use super::allocation::{allocate_to_sub_albums, deallocate_from_sub_albums, sub_album_name};
use super::outbox::Outbox;
use super::MembershipChange;
use crate::frame_store::{
    membership, record, Album, Filter, Image, Orientation, StoreError, StoreResult,
};
use rand::Rng;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlbumSummary {
    #[serde(flatten)]
    pub album: Album,
    pub image_count: usize,
}

fn summarize(conn: &Connection, album: Album) -> StoreResult<AlbumSummary> {
    let image_count = membership::image_count(conn, &album.id)?;
    Ok(AlbumSummary { album, image_count })
}

/// Loads an album that users may manage directly, i.e. not a sub-album.
fn get_top_level(conn: &Connection, album_id: &str) -> StoreResult<Album> {
    let album: Album = record::get(conn, album_id)?;
    if album.is_sub_album() {
        return Err(StoreError::SubAlbumNotSplittable(album.id));
    }
    Ok(album)
}

pub fn create_album(conn: &Connection, name: &str, orientation: Orientation) -> StoreResult<Album> {
    let album = Album::new(name, orientation);
    record::insert(conn, &album)?;
    info!("Created album {} ({})", album.name, album.id);
    Ok(album)
}

pub fn get_album(conn: &Connection, album_id: &str) -> StoreResult<AlbumSummary> {
    let album: Album = record::get(conn, album_id)?;
    summarize(conn, album)
}

pub fn list_albums(conn: &Connection, top_level_only: bool) -> StoreResult<Vec<AlbumSummary>> {
    let mut filter = Filter::new().order_by("name");
    if top_level_only {
        filter = filter.is_null("parent_id");
    }
    let albums: Vec<Album> = record::list(conn, &filter)?;
    albums.into_iter().map(|a| summarize(conn, a)).collect()
}

pub fn sub_albums(conn: &Connection, parent_id: &str) -> StoreResult<Vec<AlbumSummary>> {
    let albums: Vec<Album> = record::list(
        conn,
        &Filter::new()
            .eq("parent_id", record::text(parent_id))
            .order_by("name"),
    )?;
    albums.into_iter().map(|a| summarize(conn, a)).collect()
}

pub fn album_images(conn: &Connection, album_id: &str) -> StoreResult<Vec<Image>> {
    record::get::<Album>(conn, album_id)?;
    membership::image_ids(conn, album_id)?
        .iter()
        .map(|id| record::get::<Image>(conn, id))
        .collect()
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AlbumUpdate {
    pub name: Option<String>,
    pub orientation: Option<Orientation>,
}

/// Renames or re-orients an album. Its sub-albums follow so they keep the
/// `"{parent}-{frame id}"` naming.
pub fn update_album(conn: &Connection, album_id: &str, update: AlbumUpdate) -> StoreResult<Album> {
    let mut album = get_top_level(conn, album_id)?;
    let old_name = album.name.clone();
    if let Some(name) = update.name {
        album.name = name;
    }
    if let Some(orientation) = update.orientation {
        album.orientation = orientation;
    }
    record::update(conn, &album)?;

    let old_prefix = format!("{}-", old_name);
    for summary in sub_albums(conn, &album.id)? {
        let mut sub = summary.album;
        if let Some(frame_id) = sub.name.strip_prefix(&old_prefix) {
            sub.name = sub_album_name(&album.name, frame_id);
        }
        sub.orientation = album.orientation;
        record::update(conn, &sub)?;
    }
    Ok(album)
}

/// Adds an image to a parent album and, when the album is split, to one of its
/// sub-albums. Adding a member again changes nothing.
pub fn add_image(
    conn: &Connection,
    album_id: &str,
    image_id: &str,
    outbox: &mut Outbox,
) -> StoreResult<bool> {
    let album = get_top_level(conn, album_id)?;
    record::get::<Image>(conn, image_id)?;
    if !membership::add_image(conn, &album.id, image_id)? {
        return Ok(false);
    }
    allocate_to_sub_albums(conn, &album, image_id, outbox)?;
    outbox.album_changed(&album.id);
    Ok(true)
}

/// Adds the image called `image_name` to the top-level album called `album_name`,
/// creating the album with the image's orientation when there is none.
pub fn add_image_by_name(
    conn: &Connection,
    album_name: &str,
    image_name: &str,
    outbox: &mut Outbox,
) -> StoreResult<AlbumSummary> {
    let image = record::list::<Image>(conn, &Filter::new().eq("name", record::text(image_name)))?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found("image", image_name))?;
    let existing = record::list::<Album>(
        conn,
        &Filter::new()
            .eq("name", record::text(album_name))
            .is_null("parent_id"),
    )?;
    let album = match existing.into_iter().next() {
        Some(album) => album,
        None => create_album(conn, album_name, image.orientation)?,
    };
    add_image(conn, &album.id, &image.id, outbox)?;
    summarize(conn, album)
}

/// Removes an image from a parent album and rebalances its sub-albums.
/// Removing a non-member changes nothing.
pub fn remove_image<R: Rng + ?Sized>(
    conn: &Connection,
    album_id: &str,
    image_id: &str,
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<bool> {
    let album = get_top_level(conn, album_id)?;
    if !membership::remove_image(conn, &album.id, image_id)? {
        return Ok(false);
    }
    deallocate_from_sub_albums(conn, &album, image_id, rng, outbox)?;
    outbox.album_changed(&album.id);
    Ok(true)
}

/// Makes `selected` the album's exact membership, one removal or addition at a time
/// so sub-albums stay balanced throughout.
pub fn update_images<R: Rng + ?Sized>(
    conn: &Connection,
    album_id: &str,
    selected: &[String],
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<MembershipChange> {
    let album = get_top_level(conn, album_id)?;
    let current: BTreeSet<String> = membership::image_ids(conn, &album.id)?.into_iter().collect();
    let selected: BTreeSet<String> = selected.iter().cloned().collect();

    let mut change = MembershipChange::default();
    for image_id in current.difference(&selected) {
        remove_image(conn, &album.id, image_id, rng, outbox)?;
        change.removed.push(image_id.clone());
    }
    for image_id in selected.difference(&current) {
        add_image(conn, &album.id, image_id, outbox)?;
        change.added.push(image_id.clone());
    }
    outbox.album_changed(&album.id);
    info!(
        "Album {}: {} images added, {} removed",
        album.name,
        change.added.len(),
        change.removed.len()
    );
    Ok(change)
}

/// Deletes an album with its memberships and sub-albums. Frames showing it, or
/// one of its sub-albums, are left without an album.
pub fn delete_album(conn: &Connection, album_id: &str, outbox: &mut Outbox) -> StoreResult<()> {
    let album = get_top_level(conn, album_id)?;
    let mut affected = vec![album.id.clone()];
    affected.extend(sub_albums(conn, &album.id)?.into_iter().map(|s| s.album.id));
    for id in &affected {
        // resolve() runs after the delete, so mark the frames explicitly
        let mut stmt = conn.prepare("SELECT id FROM frame WHERE album_id = ?1")?;
        let frame_ids = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for frame_id in frame_ids {
            outbox.frame_rebound(&frame_id);
        }
    }
    record::delete::<Album>(conn, &album.id)?;
    info!("Deleted album {} ({})", album.name, album.id);
    Ok(())
}

/// Deletes every top-level album called `name`. Returns how many went.
pub fn delete_albums_by_name(conn: &Connection, name: &str, outbox: &mut Outbox) -> StoreResult<usize> {
    let albums: Vec<Album> = record::list(
        conn,
        &Filter::new()
            .eq("name", record::text(name))
            .is_null("parent_id"),
    )?;
    for album in &albums {
        delete_album(conn, &album.id, outbox)?;
    }
    Ok(albums.len())
}
