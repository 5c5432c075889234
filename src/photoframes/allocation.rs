//! Splitting a parent album across the frames of a frameset, and keeping the
//! split balanced while the parent's membership changes.
//!
//! The balance invariant: with M images over N sub-albums, `M % N` sub-albums
//! hold `M / N + 1` images and the rest hold `M / N`. Equivalently, the largest
//! and smallest sub-album never differ by more than one image.

use super::frame::point_at_album;
use super::outbox::Outbox;
use crate::frame_store::{membership, record, Album, Frame, StoreError, StoreResult};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

pub fn sub_album_name(parent_name: &str, frame_id: &str) -> String {
    format!("{}-{}", parent_name, frame_id)
}

/// Group sizes for spreading `items` over `groups`: the first `items % groups`
/// groups get one extra. Empty when there are no groups.
pub fn partition_sizes(items: usize, groups: usize) -> Vec<usize> {
    if groups == 0 {
        return Vec::new();
    }
    let (per_group, extra) = (items / groups, items % groups);
    (0..groups)
        .map(|i| if i < extra { per_group + 1 } else { per_group })
        .collect()
}

fn spread(counts: &[(String, usize)]) -> usize {
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let min = counts.iter().map(|(_, c)| *c).min().unwrap_or(0);
    max - min
}

/// Creates one sub-album per frame and deals the parent's images out among them.
///
/// Sub-albums are named `"{parent}-{frame id}"`, inherit the parent's orientation,
/// and each frame is pointed at its own. With no frames this does nothing.
pub fn split_for_frameset<R: Rng + ?Sized>(
    conn: &Connection,
    parent: &Album,
    frames: &[Frame],
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<Vec<Album>> {
    if parent.is_sub_album() {
        return Err(StoreError::SubAlbumNotSplittable(parent.id.clone()));
    }
    if frames.is_empty() {
        debug!("Album {} has no frames to split across", parent.id);
        return Ok(Vec::new());
    }

    let mut pool = membership::image_ids(conn, &parent.id)?;
    let sizes = partition_sizes(pool.len(), frames.len());
    // A shuffled pool dealt out in consecutive runs is a uniform sample without
    // replacement for every sub-album.
    pool.shuffle(rng);

    let mut remaining = pool.as_slice();
    let mut sub_albums = Vec::with_capacity(frames.len());
    for (frame, size) in frames.iter().zip(sizes) {
        let mut sub_album = Album::new(sub_album_name(&parent.name, &frame.id), parent.orientation);
        sub_album.parent_id = Some(parent.id.clone());
        record::insert(conn, &sub_album)?;

        let (chunk, rest) = remaining.split_at(size);
        for image_id in chunk {
            membership::add_image(conn, &sub_album.id, image_id)?;
        }
        remaining = rest;

        point_at_album(conn, &frame.id, Some(sub_album.id.as_str()), outbox)?;
        sub_albums.push(sub_album);
    }
    debug_assert!(remaining.is_empty());

    info!(
        "Split album {} ({} images) across {} frames",
        parent.name,
        pool.len(),
        frames.len()
    );
    Ok(sub_albums)
}

/// Places an image that was just added to `parent` into its smallest sub-album.
///
/// Ties go to the lowest sub-album id. Returns the receiving sub-album, or `None`
/// when the parent is not split.
pub fn allocate_to_sub_albums(
    conn: &Connection,
    parent: &Album,
    image_id: &str,
    outbox: &mut Outbox,
) -> StoreResult<Option<String>> {
    let counts = membership::sub_album_counts(conn, &parent.id)?;
    let Some((target, _)) = counts.first() else {
        return Ok(None);
    };

    membership::add_image(conn, target, image_id)?;
    outbox.album_changed(target);
    debug!("Allocated image {} to sub-album {}", image_id, target);

    if cfg!(debug_assertions) && spread(&counts) <= 1 {
        let after = membership::sub_album_counts(conn, &parent.id)?;
        debug_assert!(spread(&after) <= 1, "sub-albums of {} unbalanced", parent.id);
    }
    Ok(Some(target.clone()))
}

/// What happened to the sub-albums when an image left the parent album.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deallocation {
    /// Parent not split, or no sub-album held the image.
    NotAllocated,
    Removed {
        from: String,
    },
    /// The removal left `from` short, so `moved_image` came over from `donor`.
    Rebalanced {
        from: String,
        donor: String,
        moved_image: String,
    },
}

/// Takes an image that just left `parent` out of whichever sub-album holds it.
///
/// When that sub-album was not among the largest, one random image moves to it
/// from a randomly chosen largest sub-album so the balance invariant still holds.
pub fn deallocate_from_sub_albums<R: Rng + ?Sized>(
    conn: &Connection,
    parent: &Album,
    image_id: &str,
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<Deallocation> {
    let counts = membership::sub_album_counts(conn, &parent.id)?;
    if counts.is_empty() {
        return Ok(Deallocation::NotAllocated);
    }

    let mut holder = None;
    for (album_id, count) in &counts {
        if membership::contains(conn, album_id, image_id)? {
            holder = Some((album_id.clone(), *count));
            break;
        }
    }
    let Some((holder_id, holder_count)) = holder else {
        return Ok(Deallocation::NotAllocated);
    };

    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let in_max_group = holder_count == max_count;

    membership::remove_image(conn, &holder_id, image_id)?;
    outbox.album_changed(&holder_id);

    if in_max_group {
        debug!("Removed image {} from sub-album {}", image_id, holder_id);
        return Ok(Deallocation::Removed { from: holder_id });
    }

    // The holder was below the max, so the max itself did not move.
    let donors: Vec<&String> = counts
        .iter()
        .filter(|(album_id, count)| *count == max_count && *album_id != holder_id)
        .map(|(album_id, _)| album_id)
        .collect();
    let Some(donor) = donors.choose(&mut *rng).map(|d| (*d).clone()) else {
        return Ok(Deallocation::Removed { from: holder_id });
    };
    let donor_images = membership::image_ids(conn, &donor)?;
    let Some(moved_image) = donor_images.choose(&mut *rng).cloned() else {
        return Ok(Deallocation::Removed { from: holder_id });
    };

    membership::remove_image(conn, &donor, &moved_image)?;
    membership::add_image(conn, &holder_id, &moved_image)?;
    outbox.album_changed(&donor);
    debug!(
        "Moved image {} from sub-album {} to {} after removing {}",
        moved_image, donor, holder_id, image_id
    );

    if cfg!(debug_assertions) && spread(&counts) <= 1 {
        let after = membership::sub_album_counts(conn, &parent.id)?;
        debug_assert!(spread(&after) <= 1, "sub-albums of {} unbalanced", parent.id);
    }
    Ok(Deallocation::Rebalanced {
        from: holder_id,
        donor,
        moved_image,
    })
}
