//! Local version-control storage engine
//!
//! A content-addressed blob store, a block-based delta codec, a concurrent
//! staging index, and commit identity hashing, with a small CLI on top.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
