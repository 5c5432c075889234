use super::album;
use super::outbox::Outbox;
use crate::frame_store::{membership, record, Album, Filter, Image, Orientation, StoreResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

/// Metadata of an uploaded picture. The file itself lives in the image directory.
#[derive(Clone, Debug, Deserialize)]
pub struct NewImage {
    pub name: String,
    #[serde(default)]
    pub keywords: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub imgtype: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

pub fn create_image(conn: &Connection, new: NewImage) -> StoreResult<Image> {
    let mut image = Image::new(new.name, new.width, new.height);
    image.keywords = new.keywords;
    if let Some(orientation) = new.orientation {
        image.orientation = orientation;
    }
    image.imgtype = new.imgtype;
    image.size = new.size;
    if let Some(created) = new.created {
        image.created = created;
    }
    record::insert(conn, &image)?;
    info!("Added image {} ({})", image.name, image.id);
    Ok(image)
}

pub fn get_image(conn: &Connection, image_id: &str) -> StoreResult<Image> {
    record::get(conn, image_id)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageUpdate {
    pub name: Option<String>,
    pub keywords: Option<String>,
}

/// Renames or re-tags an image. Frames showing it get their playlist again since
/// playlists carry image names.
pub fn update_image(
    conn: &Connection,
    image_id: &str,
    update: ImageUpdate,
    outbox: &mut Outbox,
) -> StoreResult<Image> {
    let mut image: Image = record::get(conn, image_id)?;
    let renamed = update.name.as_ref().is_some_and(|n| *n != image.name);
    if let Some(name) = update.name {
        image.name = name;
    }
    if let Some(keywords) = update.keywords {
        image.keywords = keywords;
    }
    record::update(conn, &image)?;
    if renamed {
        for album_id in membership::albums_containing(conn, &image.id)? {
            outbox.album_changed(&album_id);
        }
    }
    record::get(conn, image_id)
}

/// Deletes an image. Every album holding it loses it first, so split albums
/// are rebalanced the same way as for a plain removal.
pub fn delete_image<R: Rng + ?Sized>(
    conn: &Connection,
    image_id: &str,
    rng: &mut R,
    outbox: &mut Outbox,
) -> StoreResult<()> {
    let image: Image = record::get(conn, image_id)?;
    for album_id in membership::albums_containing(conn, &image.id)? {
        // sub-album copies go through the parent's removal
        let Some(holder) = record::find::<Album>(conn, &album_id)? else {
            continue;
        };
        if !holder.is_sub_album() {
            album::remove_image(conn, &holder.id, &image.id, rng, outbox)?;
        }
    }
    record::delete::<Image>(conn, &image.id)?;
    info!("Deleted image {} ({})", image.name, image.id);
    Ok(())
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageQuery {
    pub orientation: Option<Orientation>,
    /// Space separated words. Each must appear as a whole word in the keywords.
    pub keywords: Option<String>,
}

fn keyword_patterns(keywords: &str) -> Vec<Regex> {
    keywords
        .split_whitespace()
        .filter_map(|word| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok())
        .collect()
}

pub fn list_images(conn: &Connection, query: &ImageQuery) -> StoreResult<Vec<Image>> {
    let mut filter = Filter::new().order_by("name");
    if let Some(orientation) = query.orientation {
        filter = filter.eq("orientation", record::text(orientation.to_db_str()));
    }
    let images: Vec<Image> = record::list(conn, &filter)?;

    let patterns = query.keywords.as_deref().map(keyword_patterns).unwrap_or_default();
    Ok(images
        .into_iter()
        .filter(|image| patterns.iter().all(|p| p.is_match(&image.keywords)))
        .collect())
}
