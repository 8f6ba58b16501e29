use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A stored artifact. Every field is fixed at first insert.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct File {
    pub hash: String,
    pub mimetype: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub data: Vec<u8>,
}

impl File {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            hash: self.hash.clone(),
            mimetype: self.mimetype.clone(),
            created_by: self.created_by.clone(),
            created_at: self.created_at,
            size: self.data.len() as i64,
        }
    }
}

/// Everything about a [`File`] except its payload.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct FileMeta {
    pub hash: String,
    pub mimetype: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub size: i64,
}

/// An upload that has been read and addressed but not yet persisted.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub hash: String,
    pub mimetype: String,
    pub created_by: String,
    pub data: Vec<u8>,
}

impl NewFile {
    pub fn new(
        hash: impl Into<String>,
        mimetype: impl Into<String>,
        created_by: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            hash: hash.into(),
            mimetype: mimetype.into(),
            created_by: created_by.into(),
            data,
        }
    }

    /// Materialise the record as the backend would store it, stamped now.
    pub fn into_file(self) -> File {
        File {
            hash: self.hash,
            mimetype: self.mimetype,
            created_by: self.created_by,
            created_at: Utc::now(),
            data: self.data,
        }
    }
}
