use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::path::Path;

impl Repository {
    pub async fn hash_object(&mut self, file: &str, write: bool) -> anyhow::Result<()> {
        let content = self.workspace().read_file(Path::new(file)).await?;

        let object_id = if write {
            if !self.is_initialized() {
                anyhow::bail!("not a strata repository: {}", self.path().display());
            }
            self.database().create(&content)?
        } else {
            ObjectId::hash(&content)
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
