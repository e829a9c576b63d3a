//! Content-addressed blob store
//!
//! Objects live under `objects/<first 2 hex chars>/<remaining 62>` and hold the
//! zlib-compressed content. The digest is always computed over the
//! uncompressed bytes, so identity does not depend on the compression level.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    compression: flate2::Compression,
}

impl Database {
    pub fn new(path: Box<Path>, compression: flate2::Compression) -> Self {
        Database { path, compression }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store `content` and return its digest
    ///
    /// Storing content that is already present is a no-op, so concurrent
    /// writers of the same content never conflict.
    pub fn create(&self, content: &[u8]) -> Result<ObjectId> {
        let object_id = ObjectId::hash(content);

        if self.exists(&object_id)? {
            debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_path = self.path.join(object_id.to_path());
        let object_dir = object_path
            .parent()
            .ok_or_else(|| {
                Error::InvalidInput(format!("invalid object path {}", object_path.display()))
            })?;
        std::fs::create_dir_all(object_dir).map_err(|e| Error::io(object_dir, e))?;

        self.write_object(&object_path, content)?;
        debug!(oid = %object_id, size = content.len(), "stored object");

        Ok(object_id)
    }

    /// Decompressed content of a stored object
    pub fn read(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let compressed = std::fs::read(&object_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(object_id.clone()),
            _ => Error::io(&object_path, e),
        })?;

        Self::decompress(&compressed).map_err(|source| Error::Corrupt {
            oid: object_id.clone(),
            source,
        })
    }

    pub fn exists(&self, object_id: &ObjectId) -> Result<bool> {
        let object_path = self.path.join(object_id.to_path());

        match std::fs::metadata(&object_path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(object_path, e)),
        }
    }

    /// Remove a stored object, and its shard directory once empty
    pub fn delete(&self, object_id: &ObjectId) -> Result<()> {
        let object_path = self.path.join(object_id.to_path());

        std::fs::remove_file(&object_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(object_id.clone()),
            _ => Error::io(&object_path, e),
        })?;
        debug!(oid = %object_id, "deleted object");

        if let Some(object_dir) = object_path.parent()
            && let Ok(mut remaining) = std::fs::read_dir(object_dir)
            && remaining.next().is_none()
        {
            std::fs::remove_dir(object_dir).map_err(|e| Error::io(object_dir, e))?;
        }

        Ok(())
    }

    /// Find all objects whose digest starts with the given prefix.
    ///
    /// Used to resolve abbreviated digests to their full form. If multiple
    /// matches are found, all are returned (indicating an ambiguous prefix).
    ///
    /// # Performance
    ///
    /// - For prefixes of 2+ characters, only searches the specific shard directory
    /// - For prefixes of 0-1 characters, must search all shards (slower)
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(prefix.to_string()));
        }

        let prefix = prefix.to_ascii_lowercase();
        let shards = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255).map(|i| format!("{i:02x}")).collect()
        };

        let mut matches = Vec::new();
        for shard in shards {
            let dir_path = self.path.join(&shard);
            if !dir_path.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir_path).map_err(|e| Error::io(&dir_path, e))? {
                let entry = entry.map_err(|e| Error::io(&dir_path, e))?;
                let full_oid = format!("{}{}", shard, entry.file_name().to_string_lossy());

                if full_oid.starts_with(&prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| {
                Error::InvalidInput(format!("invalid object path {}", object_path.display()))
            })?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = self
            .compress(content)
            .map_err(|e| Error::io(&temp_object_path, e))?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .map_err(|e| Error::io(&temp_object_path, e))?;
        file.write_all(&compressed)
            .map_err(|e| Error::io(&temp_object_path, e))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_object_path);
            Error::io(object_path, e)
        })
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}-{}", std::process::id(), rand::random::<u64>())
    }
}
