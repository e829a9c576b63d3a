//! Library error type
//!
//! Every fallible operation in the object database, the delta codec and the
//! staging index reports one of these kinds. The command layer wraps them in
//! `anyhow` for user-facing context.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Object or index path that does not exist
    #[error("object {0} not found")]
    NotFound(ObjectId),

    /// Stored bytes that cannot be decompressed
    #[error("object {oid} is corrupt: {source}")]
    Corrupt {
        oid: ObjectId,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("copy instruction out of bounds: offset={offset}, base length={base_len}")]
    OutOfBounds { offset: usize, base_len: usize },

    #[error("invalid delta instruction: {0}")]
    InvalidInstruction(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed index file {}: {source}", path.display())]
    IndexFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Staging task that ended without producing a result
    #[error("staging task interrupted: {0}")]
    Interrupted(#[source] tokio::task::JoinError),

    /// Per-file failures collected from a staging batch
    #[error("failed to stage {} file(s)", failures.len())]
    Staging { failures: Vec<(PathBuf, Error)> },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
