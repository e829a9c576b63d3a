//! Index file format
//!
//! The index (also called staging area) maps working-tree paths to the blob
//! holding their last staged content. It is persisted as pretty-printed JSON:
//!
//! ```text
//! {
//!   "updated_at": "2024-06-16T10:02:03.123456789Z",
//!   "entries": {
//!     "src/main.rs": { "path": "src/main.rs", "oid": "<64 hex>", "mode": 33188,
//!                      "size": 120, "modified_at": "..." }
//!   }
//! }
//! ```

pub mod index_entry;
pub mod stage_outcome;

/// Name of the advisory lock file guarding index reads and writes
pub const LOCK_FILE_NAME: &str = "index.lock";
