//! Core repository components
//!
//! - `database`: content-addressed blob store
//! - `index`: staging index persistence and the per-path staging step
//! - `staging`: concurrent batch staging on top of the index
//! - `repository`: wires the areas together from the repository config
//! - `workspace`: working tree file system access

pub mod database;
pub mod index;
pub mod repository;
pub mod staging;
pub mod workspace;
