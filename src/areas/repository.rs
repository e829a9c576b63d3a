use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::staging::StagingArea;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::config::Config;
use crate::artifacts::core::{IGNORE_FILE, METADATA_DIR};
use crate::artifacts::delta::DeltaCodec;
use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::index::stage_outcome::StagingReport;
use crate::errors::{Error, Result};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    config: Config,
    index: Arc<Mutex<Index>>,
    database: Arc<Database>,
    workspace: Arc<Workspace>,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        }
        let path = path.canonicalize().map_err(|e| Error::io(path, e))?;
        let metadata_path = path.join(METADATA_DIR);

        let config = Config::load(&metadata_path.join("config"))?;
        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(
            metadata_path.join("objects").into_boxed_path(),
            config.compression(),
        );
        let workspace = Workspace::new(path.clone().into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            config,
            index: Arc::new(Mutex::new(index)),
            database: Arc::new(database),
            workspace: Arc::new(workspace),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn is_initialized(&self) -> bool {
        self.metadata_path().is_dir()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Staging batch runner wired to this repository's stores and settings
    ///
    /// Ignore rules are read from the ignore file at the root each time.
    pub fn staging_area(&self) -> Result<StagingArea> {
        let ignore_rules = IgnoreRules::load(&self.path.join(IGNORE_FILE), METADATA_DIR)?;

        Ok(StagingArea::new(
            self.database.clone(),
            self.index.clone(),
            self.workspace.clone(),
            Arc::new(ignore_rules),
            DeltaCodec::new(self.config.staging.block_size),
            self.config.staging.max_parallel_files,
        ))
    }

    pub async fn add_to_index(&self, files: Vec<PathBuf>) -> Result<StagingReport> {
        self.staging_area()?.add_to_index(files).await
    }
}
