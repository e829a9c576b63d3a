use crate::areas::repository::Repository;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Error;

impl Repository {
    pub fn cat_file(&mut self, object_sha: &str) -> anyhow::Result<()> {
        let oid = self.resolve_object_id(object_sha)?;
        let content = self.database().read(&oid)?;

        self.writer().write_all(&content)?;

        Ok(())
    }

    /// Resolve a full or abbreviated digest to a stored object
    fn resolve_object_id(&self, object_sha: &str) -> anyhow::Result<ObjectId> {
        if object_sha.len() == OBJECT_ID_LENGTH {
            return Ok(ObjectId::try_parse(object_sha.to_string())?);
        }
        if object_sha.len() < 4 || !object_sha.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(object_sha.to_string()).into());
        }

        let mut candidates = self.database().find_objects_by_prefix(object_sha)?;
        match candidates.len() {
            0 => anyhow::bail!("no object matches {object_sha}"),
            1 => Ok(candidates.remove(0)),
            n => anyhow::bail!("short object id {object_sha} is ambiguous ({n} candidates)"),
        }
    }
}
