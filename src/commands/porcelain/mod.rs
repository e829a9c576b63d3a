//! Porcelain commands (user-facing operations)
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files into the index

pub mod add;
pub mod init;
