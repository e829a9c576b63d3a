//! Object identity and commit metadata
//!
//! Every stored object is identified by the SHA-256 digest of its
//! uncompressed content. Commits derive their identity from their metadata
//! fields with the same hash function.

pub mod commit;
pub mod object_id;

/// Length of a SHA-256 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 64;
