//! Fixtures for the photoframes unit tests.

use crate::frame_store::{membership, record, Album, Frame, Image, Orientation, StoreResult};
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Top-level album holding `count` images with stable, sortable ids.
pub fn seed_album(conn: &Connection, name: &str, count: usize) -> StoreResult<(Album, Vec<Image>)> {
    let album = Album::new(name, Orientation::Horizontal);
    record::insert(conn, &album)?;
    let mut images = Vec::with_capacity(count);
    for i in 0..count {
        images.push(seed_image(conn, &album, &format!("{}-{:03}.jpg", name, i))?);
    }
    Ok((album, images))
}

/// New image with id `img-{name}`, added to `album`'s own membership only.
pub fn seed_image(conn: &Connection, album: &Album, name: &str) -> StoreResult<Image> {
    let mut image = Image::new(name, 1600, 1200);
    image.id = format!("img-{}", name);
    record::insert(conn, &image)?;
    membership::add_image(conn, &album.id, &image.id)?;
    Ok(image)
}

/// `count` standalone frames with ids `frame-00`, `frame-01`, ...
pub fn seed_frames(conn: &Connection, count: usize) -> StoreResult<Vec<Frame>> {
    (0..count)
        .map(|i| {
            let frame = Frame::new(format!("frame-{:02}", i));
            record::insert(conn, &frame)?;
            Ok(frame)
        })
        .collect()
}

pub fn sub_album_sizes(conn: &Connection, parent_id: &str) -> StoreResult<Vec<usize>> {
    Ok(membership::sub_album_counts(conn, parent_id)?
        .into_iter()
        .map(|(_, c)| c)
        .collect())
}

pub fn sub_album_union(conn: &Connection, parent_id: &str) -> StoreResult<BTreeSet<String>> {
    let mut union = BTreeSet::new();
    for (sub_id, _) in membership::sub_album_counts(conn, parent_id)? {
        for image_id in membership::image_ids(conn, &sub_id)? {
            assert!(union.insert(image_id), "image allocated twice");
        }
    }
    Ok(union)
}

/// Sub-album id to member ids.
pub fn sub_album_memberships(
    conn: &Connection,
    parent_id: &str,
) -> StoreResult<Vec<(String, Vec<String>)>> {
    let mut out = Vec::new();
    for (sub_id, _) in membership::sub_album_counts(conn, parent_id)? {
        let ids = membership::image_ids(conn, &sub_id)?;
        out.push((sub_id, ids));
    }
    out.sort();
    Ok(out)
}
