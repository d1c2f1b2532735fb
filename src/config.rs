use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the project root that holds `data/`.
pub const ROOT_ENV: &str = "HOUSING_INGEST_ROOT";

/// File stem the dev tools operate on when no path is given.
pub const DEFAULT_DATASET_STEM: &str = "Ames_Housing_Data";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_root: PathBuf,
}

impl Settings {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Resolve settings: explicit root, then `HOUSING_INGEST_ROOT`, then `.`.
    pub fn resolve(explicit_root: Option<&Path>) -> Self {
        let data_root = explicit_root
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ROOT_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self { data_root }
    }

    /// `<root>/data/processed`, where archives are extracted by default.
    pub fn processed_dir(&self) -> PathBuf {
        self.data_root.join("data").join("processed")
    }

    pub fn default_tsv(&self) -> PathBuf {
        self.processed_dir()
            .join(format!("{DEFAULT_DATASET_STEM}.tsv"))
    }

    pub fn default_csv(&self) -> PathBuf {
        self.processed_dir()
            .join(format!("{DEFAULT_DATASET_STEM}.csv"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(None)
    }
}
