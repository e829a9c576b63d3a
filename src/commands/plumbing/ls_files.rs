use crate::areas::repository::Repository;

impl Repository {
    pub async fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for entry in index.entries() {
            if stage {
                writeln!(
                    self.writer(),
                    "{:o} {} {}",
                    entry.metadata.mode,
                    entry.oid,
                    entry.path.display()
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.path.display())?;
            }
        }

        Ok(())
    }
}
