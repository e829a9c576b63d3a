//! Repository configuration
//!
//! Stored as TOML in `.strata/config`:
//!
//! ```toml
//! [core]
//! repository_format_version = 0
//! compression_level = 6
//!
//! [staging]
//! block_size = 4096
//! max_parallel_files = 0
//! ```
//!
//! Missing keys fall back to their defaults; a missing file is the default config.

use crate::artifacts::delta::BLOCK_SIZE;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
    pub staging: StagingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub repository_format_version: u32,
    /// zlib level, 0 (store) to 9 (best)
    pub compression_level: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            repository_format_version: 0,
            compression_level: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Delta block size in bytes
    pub block_size: usize,
    /// Cap on files processed at once; 0 means one task per file
    pub max_parallel_files: usize,
}

impl Default for StagingConfig {
    fn default() -> Self {
        StagingConfig {
            block_size: BLOCK_SIZE,
            max_parallel_files: 0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::io(path, e)),
        };

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }

    pub fn compression(&self) -> flate2::Compression {
        flate2::Compression::new(self.core.compression_level)
    }

    fn validate(&self) -> Result<()> {
        if self.core.compression_level > 9 {
            return Err(Error::Config(format!(
                "core.compression_level must be between 0 and 9, got {}",
                self.core.compression_level
            )));
        }
        if self.staging.block_size == 0 {
            return Err(Error::Config(
                "staging.block_size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
