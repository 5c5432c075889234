//! Album/image membership rows (`album_image`).

use super::error::StoreResult;
use rusqlite::{params, Connection};

/// Returns `true` if the row was inserted, `false` if the image was already a member.
pub fn add_image(conn: &Connection, album_id: &str, image_id: &str) -> StoreResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO album_image (album_id, image_id) VALUES (?1, ?2)",
        params![album_id, image_id],
    )?;
    Ok(inserted > 0)
}

/// Returns `true` if a row was removed.
pub fn remove_image(conn: &Connection, album_id: &str, image_id: &str) -> StoreResult<bool> {
    let removed = conn.execute(
        "DELETE FROM album_image WHERE album_id = ?1 AND image_id = ?2",
        params![album_id, image_id],
    )?;
    Ok(removed > 0)
}

pub fn contains(conn: &Connection, album_id: &str, image_id: &str) -> StoreResult<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM album_image WHERE album_id = ?1 AND image_id = ?2",
        params![album_id, image_id],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

pub fn image_count(conn: &Connection, album_id: &str) -> StoreResult<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM album_image WHERE album_id = ?1",
        params![album_id],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}

/// Member image ids, ascending.
pub fn image_ids(conn: &Connection, album_id: &str) -> StoreResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT image_id FROM album_image WHERE album_id = ?1 ORDER BY image_id")?;
    let ids = stmt
        .query_map(params![album_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

/// Member image names, the playlist a frame receives.
pub fn image_names(conn: &Connection, album_id: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT image.name FROM album_image
         JOIN image ON image.id = album_image.image_id
         WHERE album_image.album_id = ?1
         ORDER BY image.name",
    )?;
    let names = stmt
        .query_map(params![album_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Ids of the albums holding `image_id`, ascending.
pub fn albums_containing(conn: &Connection, image_id: &str) -> StoreResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT album_id FROM album_image WHERE image_id = ?1 ORDER BY album_id")?;
    let ids = stmt
        .query_map(params![image_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

/// Per-album image counts for the sub-albums of `parent_id`, ordered by
/// `(count, album id)` ascending. Empty sub-albums are included.
pub fn sub_album_counts(conn: &Connection, parent_id: &str) -> StoreResult<Vec<(String, usize)>> {
    let mut stmt = conn.prepare(
        "SELECT album.id, COUNT(album_image.image_id) AS cnt
         FROM album LEFT JOIN album_image ON album_image.album_id = album.id
         WHERE album.parent_id = ?1
         GROUP BY album.id
         ORDER BY cnt, album.id",
    )?;
    let counts = stmt
        .query_map(params![parent_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(counts)
}
