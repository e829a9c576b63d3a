//! Core utilities and shared types
//!
//! - `config`: repository configuration loaded from `.strata/config`

pub mod config;

/// Name of the metadata directory at the repository root
pub const METADATA_DIR: &str = ".strata";

/// Name of the ignore file at the repository root
pub const IGNORE_FILE: &str = ".strataignore";
