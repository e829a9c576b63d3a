//! Plumbing commands (low-level object and index access)
//!
//! - `cat-file`: Print the content of a stored object
//! - `hash-object`: Compute an object digest and optionally store the content
//! - `ls-files`: List the paths recorded in the index

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
