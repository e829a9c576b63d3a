use crate::artifacts::core::METADATA_DIR;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Working tree rooted at the repository path
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Express `path` relative to the workspace root
    ///
    /// Relative paths are taken as already relative to the root. Absolute
    /// paths outside the root are rejected.
    pub fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.path)
                .map_err(|_| {
                    Error::InvalidInput(format!(
                        "{} is outside repository at {}",
                        path.display(),
                        self.path.display()
                    ))
                })?
                .to_path_buf()
        } else {
            path.to_path_buf()
        };

        let normalized = relative
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect::<PathBuf>();
        if normalized
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(Error::InvalidInput(format!(
                "{} escapes the repository",
                path.display()
            )));
        }

        Ok(normalized)
    }

    /// Expand `path` into the files it denotes, relative to the root
    ///
    /// Directories are walked recursively, skipping the metadata directory.
    /// Anything else, including paths that do not exist, is returned as is
    /// so that staging can report it per file.
    pub fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let absolute_path = self.path.join(self.relative_path(path)?);

        if !absolute_path.is_dir() {
            return Ok(vec![self.relative_path(&absolute_path)?]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&absolute_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR)
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(absolute_path.as_path()).to_path_buf();
                Error::io(path, e.into())
            })?;

            if entry.file_type().is_file() {
                files.push(self.relative_path(entry.path())?);
            }
        }

        Ok(files)
    }

    pub async fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = tokio::fs::read(&file_path)
            .await
            .map_err(|e| Error::io(file_path, e))?;

        Ok(content.into())
    }

    pub async fn stat_file(&self, file_path: &Path) -> Result<Metadata> {
        let file_path = self.path.join(file_path);

        tokio::fs::metadata(&file_path)
            .await
            .map_err(|e| Error::io(file_path, e))
    }
}
