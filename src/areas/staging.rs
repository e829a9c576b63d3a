//! Concurrent staging of a batch of files
//!
//! Every file is processed by its own task. Reading the working tree and
//! hashing happen without holding the index; the check-diff-write sequence
//! for a path happens under the index mutex, so no update is ever lost to a
//! concurrent task. The batch either persists every change or none of them;
//! a failed batch also drops its unsaved entries from the shared index.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::delta::DeltaCodec;
use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::index::stage_outcome::{StageOutcome, StagingReport};
use crate::errors::{Error, Result};
use derive_new::new;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, new)]
pub struct StagingArea {
    database: Arc<Database>,
    index: Arc<Mutex<Index>>,
    workspace: Arc<Workspace>,
    ignore_rules: Arc<IgnoreRules>,
    codec: DeltaCodec,
    /// Upper bound on files processed at once; 0 leaves it unbounded
    max_parallel_files: usize,
}

impl StagingArea {
    /// Stage `files` and persist the index once all of them succeeded
    ///
    /// Paths may be absolute (inside the workspace) or relative to the
    /// workspace root. On any per-file failure nothing is persisted and the
    /// returned [`Error::Staging`] lists every failed path.
    pub async fn add_to_index(&self, files: Vec<PathBuf>) -> Result<StagingReport> {
        self.index.lock().await.rehydrate()?;

        let limiter = (self.max_parallel_files > 0)
            .then(|| Arc::new(Semaphore::new(self.max_parallel_files)));

        let mut report = StagingReport::default();
        let mut failures = Vec::new();
        let mut tasks = JoinSet::new();

        for file in files {
            let path = match self.workspace.relative_path(&file) {
                Ok(path) => path,
                Err(e) => {
                    failures.push((file, e));
                    continue;
                }
            };

            if self.ignore_rules.should_ignore(&path) {
                debug!(path = %path.display(), "ignored");
                report.record(StageOutcome::Ignored);
                continue;
            }

            let staging = self.clone();
            let limiter = limiter.clone();
            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };

                let outcome = staging.stage_file(&path).await;
                (path, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (path, outcome) = match joined {
                Ok(result) => result,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    tasks.shutdown().await;
                    self.discard_unsaved().await?;
                    return Err(Error::Interrupted(e));
                }
            };

            match outcome {
                Ok(outcome) => {
                    debug!(path = %path.display(), ?outcome, "staged");
                    report.record(outcome);
                }
                Err(e) => failures.push((path, e)),
            }
        }

        if !failures.is_empty() {
            for (path, error) in &failures {
                warn!(path = %path.display(), %error, "failed to stage");
            }
            failures.sort_by(|(a, _), (b, _)| a.cmp(b));

            self.discard_unsaved().await?;
            return Err(Error::Staging { failures });
        }

        self.index.lock().await.write_updates()?;
        info!(
            added = report.added,
            updated = report.updated,
            unchanged = report.unchanged,
            ignored = report.ignored,
            skipped = report.skipped,
            "staging batch complete"
        );

        Ok(report)
    }

    /// Reset the shared index to what is on disk
    async fn discard_unsaved(&self) -> Result<()> {
        self.index.lock().await.rehydrate()
    }

    async fn stage_file(&self, path: &Path) -> Result<StageOutcome> {
        let stat = self.workspace.stat_file(path).await?;
        if stat.is_dir() {
            return Ok(StageOutcome::Skipped);
        }

        let content = self.workspace.read_file(path).await?;
        let metadata = EntryMetadata::try_from(&stat)
            .map_err(|e| Error::io(self.workspace.path().join(path), e))?;

        // the whole inspect-and-replace sequence for this path holds the lock
        let mut index = self.index.lock().await;
        index.stage(
            &self.database,
            &self.codec,
            path.to_path_buf(),
            &content,
            metadata,
        )
    }
}
