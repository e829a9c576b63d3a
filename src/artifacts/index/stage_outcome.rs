//! Result of staging a single path and of a whole batch

use std::fmt;

/// What happened to one path during a staging batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// No entry existed; a blob was stored and an entry inserted
    Added,
    /// Content changed; a new blob was stored and the entry overwritten
    Updated,
    /// Content matched the staged blob; the entry was left untouched
    Unchanged,
    /// Excluded by the ignore rules
    Ignored,
    /// A directory; callers are expected to expand directories beforehand
    Skipped,
}

/// Per-outcome counters of a staging batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingReport {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub ignored: usize,
    pub skipped: usize,
}

impl StagingReport {
    pub fn record(&mut self, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Added => self.added += 1,
            StageOutcome::Updated => self.updated += 1,
            StageOutcome::Unchanged => self.unchanged += 1,
            StageOutcome::Ignored => self.ignored += 1,
            StageOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Number of paths whose entry was written
    pub fn staged(&self) -> usize {
        self.added + self.updated
    }
}

impl fmt::Display for StagingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Staged {} file(s): {} added, {} updated, {} unchanged",
            self.staged(),
            self.added,
            self.updated,
            self.unchanged
        )
    }
}
