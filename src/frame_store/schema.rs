//! SQLite schema for the frames database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1 - Images, albums, frames and framesets
// =============================================================================

const IMAGE_TABLE_V1: Table = Table {
    name: "image",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("keywords", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("width", &SqlType::Integer, non_null = true),
        sqlite_column!("height", &SqlType::Integer, non_null = true),
        sqlite_column!("orientation", &SqlType::Text, non_null = true),
        sqlite_column!("imgtype", &SqlType::Text),
        sqlite_column!("size", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("updated", &SqlType::Text, non_null = true),
    ],
    primary_key: &[],
    indices: &[("idx_image_name", "name")],
};

const ALBUM_TABLE_V1: Table = Table {
    name: "album",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("orientation", &SqlType::Text, non_null = true),
        sqlite_column!("parent_id", &SqlType::Text),
        sqlite_column!("updated", &SqlType::Text, non_null = true),
    ],
    primary_key: &[],
    indices: &[("idx_album_parent", "parent_id"), ("idx_album_name", "name")],
};

const ALBUM_IMAGE_TABLE_V1: Table = Table {
    name: "album_image",
    columns: &[
        sqlite_column!("album_id", &SqlType::Text, non_null = true),
        sqlite_column!("image_id", &SqlType::Text, non_null = true),
    ],
    primary_key: &["album_id", "image_id"],
    indices: &[("idx_album_image_image", "image_id")],
};

const FRAME_TABLE_V1: Table = Table {
    name: "frame",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("frameset_id", &SqlType::Text),
        sqlite_column!("album_id", &SqlType::Text),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("orientation", &SqlType::Text, non_null = true, default_value = Some("'H'")),
        sqlite_column!("interval_time", &SqlType::Integer, non_null = true, default_value = Some("1")),
        sqlite_column!("interval_units", &SqlType::Text, non_null = true, default_value = Some("'hours'")),
        sqlite_column!("variance_pct", &SqlType::Integer, non_null = true, default_value = Some("10")),
        sqlite_column!("shutdown", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("brightness", &SqlType::Real, non_null = true, default_value = Some("1.0")),
        sqlite_column!("contrast", &SqlType::Real, non_null = true, default_value = Some("1.0")),
        sqlite_column!("saturation", &SqlType::Real, non_null = true, default_value = Some("1.0")),
        sqlite_column!("freespace", &SqlType::Integer, non_null = true, default_value = Some("9999")),
        sqlite_column!("ip", &SqlType::Text),
        sqlite_column!("log_level", &SqlType::Text, non_null = true, default_value = Some("'INFO'")),
        sqlite_column!("updated", &SqlType::Text, non_null = true),
    ],
    primary_key: &[],
    indices: &[
        ("idx_frame_frameset", "frameset_id"),
        ("idx_frame_album", "album_id"),
    ],
};

const FRAMESET_TABLE_V1: Table = Table {
    name: "frameset",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("user_id", &SqlType::Text),
        sqlite_column!("album_id", &SqlType::Text),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("orientation", &SqlType::Text, non_null = true, default_value = Some("'H'")),
        sqlite_column!("interval_time", &SqlType::Integer, non_null = true, default_value = Some("1")),
        sqlite_column!("interval_units", &SqlType::Text, non_null = true, default_value = Some("'hours'")),
        sqlite_column!("variance_pct", &SqlType::Integer, non_null = true, default_value = Some("10")),
        sqlite_column!("updated", &SqlType::Text, non_null = true),
    ],
    primary_key: &[],
    indices: &[],
};

// =============================================================================
// Version 2 - Smart album columns
// =============================================================================

const ALBUM_TABLE_V2: Table = Table {
    name: "album",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("orientation", &SqlType::Text, non_null = true),
        sqlite_column!("parent_id", &SqlType::Text),
        sqlite_column!("updated", &SqlType::Text, non_null = true),
        sqlite_column!("smart", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("rules", &SqlType::Text),
    ],
    primary_key: &[],
    indices: &[("idx_album_parent", "parent_id"), ("idx_album_name", "name")],
};

fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute(
        "ALTER TABLE album ADD COLUMN smart INTEGER NOT NULL DEFAULT 0",
        [],
    )?;
    conn.execute("ALTER TABLE album ADD COLUMN rules TEXT", [])?;
    Ok(())
}

pub const FRAME_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[
            IMAGE_TABLE_V1,
            ALBUM_TABLE_V1,
            ALBUM_IMAGE_TABLE_V1,
            FRAME_TABLE_V1,
            FRAMESET_TABLE_V1,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[
            IMAGE_TABLE_V1,
            ALBUM_TABLE_V2,
            ALBUM_IMAGE_TABLE_V1,
            FRAME_TABLE_V1,
            FRAMESET_TABLE_V1,
        ],
        migration: Some(migrate_v1_to_v2),
    },
];
