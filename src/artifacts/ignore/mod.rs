//! Ignore rules
//!
//! Patterns are read from `.strataignore` at the repository root, one per line.
//!
//! - blank lines and lines starting with `#` are skipped
//! - `!pattern` rescues a base name from every other rule; negations are
//!   checked before every pattern
//! - `/prefix` matches repository-relative paths starting with `prefix`
//! - `dir/` matches the directory itself and anything beneath it
//! - any other pattern is a glob matched against the base name
//!
//! The metadata directory is always ignored, whatever the negations say.

use crate::errors::{Error, Result};
use std::path::{Component, Path};

/// Pattern list loaded from an ignore file
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<String>,
    metadata_dir: String,
}

impl IgnoreRules {
    /// Build rules from raw pattern lines, always excluding `metadata_dir`
    pub fn new(patterns: impl IntoIterator<Item = String>, metadata_dir: &str) -> Self {
        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.trim().to_string())
            .filter(|pattern| !pattern.is_empty() && !pattern.starts_with('#'))
            .collect::<Vec<_>>();

        IgnoreRules {
            patterns,
            metadata_dir: metadata_dir.trim_end_matches('/').to_string(),
        }
    }

    /// Read the ignore file; a missing file yields no patterns
    pub fn load(ignore_file: &Path, metadata_dir: &str) -> Result<Self> {
        match std::fs::read_to_string(ignore_file) {
            Ok(content) => Ok(Self::new(
                content.lines().map(str::to_string),
                metadata_dir,
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::new(Vec::new(), metadata_dir))
            }
            Err(e) => Err(Error::io(ignore_file, e)),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn metadata_dir(&self) -> &str {
        &self.metadata_dir
    }

    /// Whether a repository-relative path is excluded
    pub fn should_ignore(&self, path: &Path) -> bool {
        let relative_path = normalize(path);
        if is_within(&relative_path, &self.metadata_dir) {
            return true;
        }

        let base_name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str());

        let rescued = self
            .patterns
            .iter()
            .filter_map(|pattern| pattern.strip_prefix('!'))
            .any(|pattern| glob_match(pattern, base_name));
        if rescued {
            return false;
        }

        self.patterns
            .iter()
            .filter(|pattern| !pattern.starts_with('!'))
            .any(|pattern| {
                if let Some(anchored) = pattern.strip_prefix('/') {
                    if relative_path.starts_with(anchored) {
                        return true;
                    }
                }

                if let Some(directory) = pattern.strip_suffix('/') {
                    if is_within(&relative_path, directory) {
                        return true;
                    }
                }

                glob_match(pattern, base_name)
            })
    }
}

/// Whether `path` is `directory` itself or lies beneath it
fn is_within(path: &str, directory: &str) -> bool {
    path == directory
        || path
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn glob_match(pattern: &str, name: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|pattern| pattern.matches(name))
        .unwrap_or(false)
}

/// Forward-slash form of a relative path, `.` components dropped
fn normalize(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
