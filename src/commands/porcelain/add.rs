use crate::areas::repository::Repository;
use crate::errors::Error;
use anyhow::anyhow;
use colored::Colorize;

impl Repository {
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        if !self.is_initialized() {
            anyhow::bail!("not a strata repository: {}", self.path().display());
        }

        // Expand directories into the files beneath them
        let cwd = std::env::current_dir()?;
        let files = paths
            .iter()
            .map(|path| {
                let absolute_path = cwd.join(path);
                let absolute_path = absolute_path.canonicalize().unwrap_or(absolute_path);
                self.workspace().list_files(&absolute_path)
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        match self.add_to_index(files).await {
            Ok(report) => {
                writeln!(self.writer(), "{report}")?;
                Ok(())
            }
            Err(Error::Staging { failures }) => {
                let details = failures
                    .iter()
                    .map(|(path, error)| format!("\n  {}: {error}", path.display().to_string().red()))
                    .collect::<String>();

                Err(anyhow!("failed to stage {} file(s){details}", failures.len()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
