//! Data structures and algorithms
//!
//! - `core`: configuration and repository layout constants
//! - `delta`: block-based delta computation and application
//! - `ignore`: ignore-file pattern matching
//! - `index`: index entry types and staging outcomes
//! - `objects`: object identity and commit metadata

pub mod core;
pub mod delta;
pub mod ignore;
pub mod index;
pub mod objects;
