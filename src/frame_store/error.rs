use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("frame {frame_id} already belongs to frameset {frameset_id}")]
    DuplicateMembership {
        frame_id: String,
        frameset_id: String,
    },

    #[error("{0} already exists")]
    IntegrityConflict(String),

    #[error("album {0} is a sub-album and cannot be split or managed directly")]
    SubAlbumNotSplittable(String),

    #[error("album {album_id} is already split across frameset {frameset_id}")]
    AlbumAlreadySplit {
        album_id: String,
        frameset_id: String,
    },

    #[error("frame {frame_id} has its album managed by frameset {frameset_id}")]
    FrameManagedByFrameset {
        frame_id: String,
        frameset_id: String,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
