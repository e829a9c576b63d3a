//! Command implementations
//!
//! - `plumbing`: low-level access to objects and the index
//! - `porcelain`: user-facing workflows (init, add)
//!
//! Each command is an `impl Repository` block writing its output through
//! the repository writer.

pub mod plumbing;
pub mod porcelain;
