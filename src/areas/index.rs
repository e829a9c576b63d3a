//! Staging index
//!
//! The index maps working-tree paths to the blob holding their last staged
//! content. It is loaded once per staging batch, mutated in memory under an
//! async mutex, and written back as a whole.
//!
//! ## Locking
//!
//! Reads take a shared lock and writes an exclusive lock on `index.lock`,
//! next to the index file. Writes go to a temporary file that is renamed
//! over the index, so readers never observe a partially written index.

use crate::areas::database::Database;
use crate::artifacts::delta::DeltaCodec;
use crate::artifacts::index::LOCK_FILE_NAME;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::index::stage_outcome::StageOutcome;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use fake::rand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk shape of the index
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    entries: BTreeMap<PathBuf, IndexEntry>,
}

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.strata/index`)
    path: Box<Path>,
    entries: BTreeMap<PathBuf, IndexEntry>,
    /// Time of the last successful write
    updated_at: Option<DateTime<Utc>>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// Read an index from disk; a missing or empty file yields an empty index
    pub fn load(path: Box<Path>) -> Result<Self> {
        let mut index = Index::new(path);
        index.rehydrate()?;

        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.updated_at = None;
    }

    /// Replace the in-memory state with the persisted one
    pub fn rehydrate(&mut self) -> Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut lock_file = self.open_lock_file()?;
        let _lock = file_guard::lock(&mut lock_file, file_guard::Lock::Shared, 0, 1)
            .map_err(|e| Error::io(self.lock_path(), e))?;

        let content = std::fs::read(&self.path).map_err(|e| Error::io(&*self.path, e))?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let persisted: IndexFile =
            serde_json::from_slice(&content).map_err(|source| Error::IndexFormat {
                path: self.path.to_path_buf(),
                source,
            })?;
        self.entries = persisted.entries;
        self.updated_at = persisted.updated_at;

        debug!(path = %self.path.display(), entries = self.entries.len(), "loaded index");
        Ok(())
    }

    /// Insert or overwrite the entry for `entry.path`
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Stage `content` as the new state of `path`
    ///
    /// When an entry already exists, its stored blob is read back and diffed
    /// against `content`; an identity delta leaves the entry untouched.
    /// Otherwise the content is stored and the entry written. The caller must
    /// hold exclusive access to the index for the whole call.
    pub fn stage(
        &mut self,
        database: &Database,
        codec: &DeltaCodec,
        path: PathBuf,
        content: &[u8],
        metadata: EntryMetadata,
    ) -> Result<StageOutcome> {
        let outcome = match self.entries.get(&path) {
            None => StageOutcome::Added,
            Some(entry) => {
                let staged = database.read(&entry.oid)?;
                let delta = codec.compute(&staged, content)?;

                if delta.is_identity(staged.len()) {
                    debug!(path = %path.display(), "content unchanged");
                    return Ok(StageOutcome::Unchanged);
                }

                debug!(
                    path = %path.display(),
                    instructions = delta.len(),
                    added_bytes = delta.added_bytes(),
                    encoded_bytes = delta.encode().len(),
                    "content changed"
                );
                StageOutcome::Updated
            }
        };

        let oid = database.create(content)?;
        self.add(IndexEntry::new(path, oid, metadata));

        Ok(outcome)
    }

    /// Persist the whole index, replacing the previous file atomically
    pub fn write_updates(&mut self) -> Result<()> {
        let mut lock_file = self.open_lock_file()?;
        let _lock = file_guard::lock(&mut lock_file, file_guard::Lock::Exclusive, 0, 1)
            .map_err(|e| Error::io(self.lock_path(), e))?;

        let updated_at = Utc::now();
        let persisted = IndexFile {
            updated_at: Some(updated_at),
            entries: self.entries.clone(),
        };
        let content = serde_json::to_vec_pretty(&persisted).map_err(|source| {
            Error::IndexFormat {
                path: self.path.to_path_buf(),
                source,
            }
        })?;

        let temp_path = self
            .path
            .with_file_name(format!("index.tmp-{}-{}", std::process::id(), rand::random::<u32>()));
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .write_all(&content)
            .and_then(|_| temp_file.sync_all())
            .map_err(|e| Error::io(&temp_path, e))?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            Error::io(&*self.path, e)
        })?;

        self.updated_at = Some(updated_at);
        debug!(path = %self.path.display(), entries = self.entries.len(), "wrote index");

        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_file_name(LOCK_FILE_NAME)
    }

    fn open_lock_file(&self) -> Result<std::fs::File> {
        let lock_path = self.lock_path();

        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(lock_path, e))
    }
}
