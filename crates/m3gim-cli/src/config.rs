//! Pipeline configuration: where the sheets live and where the graph goes.

use m3gim_transform::input::RECONCILIATION_FILE;
use m3gim_transform::SheetPaths;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data/sheets";
pub const DEFAULT_OUTPUT: &str = "data/output/m3gim.jsonld";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    /// Reconciliation cache; `None` disables enrichment.
    pub reconciliation: Option<PathBuf>,
}

impl PipelineConfig {
    /// Resolve the cache location: an explicit path, else the data directory's default file.
    pub fn new(data_dir: PathBuf, output: PathBuf, reconciliation: Option<PathBuf>, use_cache: bool) -> Self {
        let reconciliation = use_cache.then(|| reconciliation.unwrap_or_else(|| data_dir.join(RECONCILIATION_FILE)));
        Self {
            data_dir,
            output,
            reconciliation,
        }
    }

    pub fn sheets(&self) -> SheetPaths {
        SheetPaths::in_dir(&self.data_dir)
    }

    pub fn reconciliation_path(&self) -> Option<&Path> {
        self.reconciliation.as_deref()
    }
}
