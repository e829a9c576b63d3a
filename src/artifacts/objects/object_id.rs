//! Object identifier (SHA-256 digest)
//!
//! Object IDs are 64-character hexadecimal strings holding the SHA-256 digest
//! of an object's uncompressed content. They are the only identity an object has.
//!
//! ## Format
//!
//! - Full: 64 hex characters
//! - Short: First 7 characters
//!
//! ## Storage
//!
//! Objects are stored in `.strata/objects/<first-2-chars>/<remaining-62-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Content digest that identifies a stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// # Arguments
    ///
    /// * `id` - 64-character hexadecimal string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if invalid length/characters
    pub fn try_parse(id: String) -> Result<Self, Error> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(Error::InvalidObjectId(format!(
                "expected {OBJECT_ID_LENGTH} characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Digest the given content
    pub fn hash(content: &[u8]) -> Self {
        Self::from_digest(Sha256::digest(content).as_slice())
    }

    /// Build an ID from an already finalized digest
    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        let hex = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        Self(hex)
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the digest
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_parse(value)
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn hash_is_hex_encoded_sha256() {
        let oid = ObjectId::hash(b"");
        assert_eq!(
            oid.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn path_is_sharded_by_first_two_characters() {
        let oid = ObjectId::hash(b"hello");
        let hex = oid.to_string();
        let (dir, file) = hex.split_at(2);

        assert_eq!(oid.to_path(), PathBuf::from(dir).join(file));
        assert_eq!(file.len(), OBJECT_ID_LENGTH - 2);
    }

    #[rstest]
    #[case("abc".to_string())]
    #[case("g".repeat(OBJECT_ID_LENGTH))]
    fn try_parse_rejects_malformed_ids(#[case] id: String) {
        assert!(ObjectId::try_parse(id).is_err());
    }

    #[test]
    fn try_parse_normalizes_case() {
        let upper = ObjectId::hash(b"case").to_string().to_ascii_uppercase();
        let oid = ObjectId::try_parse(upper).unwrap();

        assert_eq!(oid, ObjectId::hash(b"case"));
    }
}
