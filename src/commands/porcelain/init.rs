use crate::areas::repository::Repository;
use crate::errors::Error;
use anyhow::Context;
use std::fs;
use tracing::info;

const DEFAULT_BRANCH: &str = "main";

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        let metadata_path = self.metadata_path();
        if metadata_path.exists() {
            return Err(Error::AlreadyExists(metadata_path).into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create objects directory")?;

        for refs_dir in ["refs/heads", "refs/tags"] {
            fs::create_dir_all(metadata_path.join(refs_dir))
                .with_context(|| format!("Failed to create {refs_dir} directory"))?;
        }

        fs::write(
            metadata_path.join("HEAD"),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )
        .context("Failed to create initial HEAD reference")?;

        self.config()
            .save(&metadata_path.join("config"))
            .context("Failed to write repository config")?;

        let index = self.index();
        let mut index = index.lock().await;
        index.write_updates().context("Failed to create index file")?;
        info!(path = %metadata_path.display(), "initialized repository");

        writeln!(
            self.writer(),
            "Initialized empty strata repository in {}",
            metadata_path.display()
        )?;

        Ok(())
    }
}
