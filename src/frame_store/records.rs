use super::error::StoreResult;
use super::models::*;
use super::record::{delete, opt_text, parse_timestamp, text, timestamp, Record};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

impl Record for Image {
    const TABLE: &'static str = "image";
    const KIND: &'static str = "image";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "keywords",
        "name",
        "width",
        "height",
        "orientation",
        "imgtype",
        "size",
        "created",
        "updated",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let orientation: String = row.get("orientation")?;
        let created: String = row.get("created")?;
        let updated: String = row.get("updated")?;
        Ok(Image {
            id: row.get("id")?,
            keywords: row.get("keywords")?,
            name: row.get("name")?,
            width: row.get("width")?,
            height: row.get("height")?,
            orientation: Orientation::from_db_str(&orientation).unwrap_or_default(),
            imgtype: row.get("imgtype")?,
            size: row.get::<_, i64>("size")?.max(0) as u64,
            created: parse_timestamp(&created),
            updated: parse_timestamp(&updated),
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.keywords),
            text(&self.name),
            Value::Integer(self.width as i64),
            Value::Integer(self.height as i64),
            text(self.orientation.to_db_str()),
            opt_text(self.imgtype.as_deref()),
            Value::Integer(self.size as i64),
            timestamp(&self.created),
            timestamp(&self.updated),
        ]
    }

    fn after_delete(conn: &Connection, id: &str) -> StoreResult<()> {
        conn.execute("DELETE FROM album_image WHERE image_id = ?1", params![id])?;
        Ok(())
    }
}

impl Record for Album {
    const TABLE: &'static str = "album";
    const KIND: &'static str = "album";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "orientation",
        "parent_id",
        "smart",
        "rules",
        "updated",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let orientation: String = row.get("orientation")?;
        let updated: String = row.get("updated")?;
        Ok(Album {
            id: row.get("id")?,
            name: row.get("name")?,
            orientation: Orientation::from_db_str(&orientation).unwrap_or_default(),
            parent_id: row.get("parent_id")?,
            smart: row.get::<_, i64>("smart")? != 0,
            rules: row.get("rules")?,
            updated: parse_timestamp(&updated),
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.name),
            text(self.orientation.to_db_str()),
            opt_text(self.parent_id.as_deref()),
            Value::Integer(self.smart as i64),
            opt_text(self.rules.as_deref()),
            timestamp(&self.updated),
        ]
    }

    /// Drops memberships, releases every frame and frameset pointing at the album,
    /// then deletes its sub-albums the same way.
    fn after_delete(conn: &Connection, id: &str) -> StoreResult<()> {
        conn.execute("DELETE FROM album_image WHERE album_id = ?1", params![id])?;
        conn.execute(
            "UPDATE frame SET album_id = NULL WHERE album_id = ?1",
            params![id],
        )?;
        conn.execute(
            "UPDATE frameset SET album_id = NULL WHERE album_id = ?1",
            params![id],
        )?;
        let sub_album_ids = {
            let mut stmt = conn.prepare("SELECT id FROM album WHERE parent_id = ?1")?;
            let ids = stmt
                .query_map(params![id], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids
        };
        for sub_album_id in sub_album_ids {
            delete::<Album>(conn, &sub_album_id)?;
        }
        Ok(())
    }
}

impl Record for Frame {
    const TABLE: &'static str = "frame";
    const KIND: &'static str = "frame";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "frameset_id",
        "album_id",
        "description",
        "orientation",
        "interval_time",
        "interval_units",
        "variance_pct",
        "shutdown",
        "brightness",
        "contrast",
        "saturation",
        "freespace",
        "ip",
        "log_level",
        "updated",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let orientation: String = row.get("orientation")?;
        let interval_units: String = row.get("interval_units")?;
        let log_level: String = row.get("log_level")?;
        let updated: String = row.get("updated")?;
        Ok(Frame {
            id: row.get("id")?,
            name: row.get("name")?,
            frameset_id: row.get("frameset_id")?,
            album_id: row.get("album_id")?,
            description: row.get("description")?,
            orientation: Orientation::from_db_str(&orientation).unwrap_or_default(),
            interval_time: row.get("interval_time")?,
            interval_units: IntervalUnits::from_db_str(&interval_units).unwrap_or_default(),
            variance_pct: row.get("variance_pct")?,
            shutdown: row.get::<_, i64>("shutdown")? != 0,
            brightness: row.get("brightness")?,
            contrast: row.get("contrast")?,
            saturation: row.get("saturation")?,
            freespace: row.get("freespace")?,
            ip: row.get("ip")?,
            log_level: FrameLogLevel::from_db_str(&log_level).unwrap_or_default(),
            updated: parse_timestamp(&updated),
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.name),
            opt_text(self.frameset_id.as_deref()),
            opt_text(self.album_id.as_deref()),
            opt_text(self.description.as_deref()),
            text(self.orientation.to_db_str()),
            Value::Integer(self.interval_time as i64),
            text(self.interval_units.to_db_str()),
            Value::Integer(self.variance_pct as i64),
            Value::Integer(self.shutdown as i64),
            Value::Real(self.brightness),
            Value::Real(self.contrast),
            Value::Real(self.saturation),
            Value::Integer(self.freespace),
            opt_text(self.ip.as_deref()),
            text(self.log_level.to_db_str()),
            timestamp(&self.updated),
        ]
    }
}

impl Record for Frameset {
    const TABLE: &'static str = "frameset";
    const KIND: &'static str = "frameset";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "user_id",
        "album_id",
        "description",
        "orientation",
        "interval_time",
        "interval_units",
        "variance_pct",
        "updated",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let orientation: String = row.get("orientation")?;
        let interval_units: String = row.get("interval_units")?;
        let updated: String = row.get("updated")?;
        Ok(Frameset {
            id: row.get("id")?,
            name: row.get("name")?,
            user_id: row.get("user_id")?,
            album_id: row.get("album_id")?,
            description: row.get("description")?,
            orientation: Orientation::from_db_str(&orientation).unwrap_or_default(),
            interval_time: row.get("interval_time")?,
            interval_units: IntervalUnits::from_db_str(&interval_units).unwrap_or_default(),
            variance_pct: row.get("variance_pct")?,
            updated: parse_timestamp(&updated),
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.name),
            opt_text(self.user_id.as_deref()),
            opt_text(self.album_id.as_deref()),
            opt_text(self.description.as_deref()),
            text(self.orientation.to_db_str()),
            Value::Integer(self.interval_time as i64),
            text(self.interval_units.to_db_str()),
            Value::Integer(self.variance_pct as i64),
            timestamp(&self.updated),
        ]
    }

    /// Members go back to being standalone frames.
    fn after_delete(conn: &Connection, id: &str) -> StoreResult<()> {
        conn.execute(
            "UPDATE frame SET frameset_id = NULL, album_id = NULL WHERE frameset_id = ?1",
            params![id],
        )?;
        Ok(())
    }
}
