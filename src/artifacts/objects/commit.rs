//! Commit metadata and its digest
//!
//! A commit ties a tree digest to its parent, an author, a timestamp and a
//! message. Its identity is derived from exactly those five fields:
//!
//! ```text
//! commit_id = SHA-256(tree || parent || author || timestamp || message)
//! ```
//!
//! where `parent` is the empty string for a root commit, `author` renders as
//! `Name <email>` and `timestamp` as RFC 3339.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Error;
use derive_new::new;
use sha2::{Digest, Sha256};

/// Author information
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    /// Format author name and email for display
    ///
    /// # Returns
    ///
    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email>"
        let email_start = value
            .find('<')
            .ok_or_else(|| Error::InvalidInput(format!("author {value:?} is missing '<'")))?;
        let email_end = value
            .rfind('>')
            .filter(|end| *end > email_start)
            .ok_or_else(|| Error::InvalidInput(format!("author {value:?} is missing '>'")))?;

        Ok(Author {
            name: value[..email_start].trim().to_string(),
            email: value[email_start + 1..email_end].to_string(),
        })
    }
}

/// Immutable commit metadata
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Commit {
    tree: ObjectId,
    parent: Option<ObjectId>,
    author: Author,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
    message: String,
}

impl Commit {
    pub fn tree(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Digest over the five commit fields, in order
    pub fn commit_id(&self) -> ObjectId {
        let mut hasher = Sha256::new();
        hasher.update(self.tree.to_string());
        hasher.update(self.parent.as_ref().map(ObjectId::to_string).unwrap_or_default());
        hasher.update(self.author.display_name());
        hasher.update(self.timestamp.to_rfc3339());
        hasher.update(&self.message);

        ObjectId::from_digest(hasher.finalize().as_slice())
    }
}
