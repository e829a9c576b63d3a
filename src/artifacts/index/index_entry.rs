//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path, relative to the repository root
//! - Digest of the blob holding its last staged content
//! - File metadata captured when it was staged (mode, size, modification time)

use crate::artifacts::objects::object_id::ObjectId;
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::os::unix::prelude::MetadataExt;
use std::path::PathBuf;

/// Index entry representing a staged file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub path: PathBuf,
    /// Digest of the staged blob
    pub oid: ObjectId,
    /// File metadata (mode, size, modification time)
    #[serde(flatten)]
    pub metadata: EntryMetadata,
}

/// File metadata stored in index entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct EntryMetadata {
    /// File mode (type and permission bits)
    pub mode: u32,
    /// File size in bytes
    pub size: u64,
    /// Last content modification time
    pub modified_at: DateTime<Utc>,
}

impl TryFrom<&Metadata> for EntryMetadata {
    type Error = std::io::Error;

    fn try_from(metadata: &Metadata) -> Result<Self, Self::Error> {
        Ok(Self {
            mode: metadata.mode(),
            size: metadata.size(),
            modified_at: metadata.modified()?.into(),
        })
    }
}
