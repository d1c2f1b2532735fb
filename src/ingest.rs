//! Ingestors turn a raw dataset file into a [`Frame`].
//!
//! [`IngestorFactory`] picks the implementation from the file extension:
//! `.zip` archives of CSV/TSV files, or a bare `.csv`/`.tsv`.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{IngestError, Result};
use crate::frame::Frame;
use crate::reader::{Delimiter, is_delimited_file, read_delimited};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Where to extract archives. Defaults to `<processed_dir>/<archive stem>`.
    pub extract_dir: Option<PathBuf>,
    /// Concatenate several data files instead of failing.
    pub concat: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            extract_dir: None,
            concat: true,
        }
    }
}

impl IngestOptions {
    pub fn with_extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = Some(dir.into());
        self
    }

    pub fn with_concat(mut self, concat: bool) -> Self {
        self.concat = concat;
        self
    }
}

pub trait DataIngestor {
    fn ingest(&self, path: &Path, options: &IngestOptions) -> Result<Frame>;
}

/// Extracts a ZIP archive and reads the CSV/TSV files it contains.
///
/// Extracted files stay on disk. When several data files are found they are
/// read in file-name order and concatenated unless `concat` is off.
#[derive(Debug, Clone)]
pub struct ZipDataIngestor {
    processed_dir: PathBuf,
}

impl ZipDataIngestor {
    pub fn new(processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            processed_dir: processed_dir.into(),
        }
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// `<processed_dir>/<archive stem>`.
    pub fn default_target(&self, archive: &Path) -> PathBuf {
        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        self.processed_dir.join(stem)
    }

    fn extract(&self, archive: &Path, target: &Path) -> Result<usize> {
        let file = File::open(archive).map_err(|e| IngestError::io(archive, e))?;
        let mut zip = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|_| IngestError::NotAZip(archive.to_path_buf()))?;
        let entries = zip.len();

        fs::create_dir_all(target).map_err(|e| IngestError::io(target, e))?;
        zip.extract(target).map_err(|source| IngestError::Zip {
            path: archive.to_path_buf(),
            source,
        })?;
        Ok(entries)
    }
}

impl Default for ZipDataIngestor {
    fn default() -> Self {
        Self::new(Settings::default().processed_dir())
    }
}

impl DataIngestor for ZipDataIngestor {
    fn ingest(&self, path: &Path, options: &IngestOptions) -> Result<Frame> {
        if !path.exists() {
            return Err(IngestError::NotFound(path.to_path_buf()));
        }

        let target = options
            .extract_dir
            .clone()
            .unwrap_or_else(|| self.default_target(path));
        let entries = self.extract(path, &target)?;
        info!(archive = %path.display(), target = %target.display(), entries, "extracted archive");

        let data_files = list_data_files(&target)?;
        match data_files.as_slice() {
            [] => Err(IngestError::NoDataFiles),
            [single] => read_delimited(single, Delimiter::for_path(single)),
            many if !options.concat => Err(IngestError::MultipleDataFiles(many.len())),
            many => {
                warn!(files = many.len(), "archive holds several data files; concatenating");
                let frames = many
                    .iter()
                    .map(|p| read_delimited(p, Delimiter::for_path(p)))
                    .collect::<Result<Vec<_>>>()?;
                Frame::concat(frames)
            }
        }
    }
}

/// Regular `*.csv` / `*.tsv` files directly inside `dir`, sorted by name.
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))? {
        let entry = entry.map_err(|e| IngestError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_delimited_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "found data files");
    Ok(files)
}

/// Reads a bare `.csv`/`.tsv` file; options are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedFileIngestor;

impl DataIngestor for DelimitedFileIngestor {
    fn ingest(&self, path: &Path, _options: &IngestOptions) -> Result<Frame> {
        read_delimited(path, Delimiter::for_path(path))
    }
}

/// Chooses a [`DataIngestor`] by file extension.
#[derive(Debug, Clone)]
pub struct IngestorFactory {
    settings: Settings,
}

impl IngestorFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// `extension` includes the leading dot and is matched exactly.
    pub fn get_ingestor(&self, extension: &str) -> Result<Box<dyn DataIngestor>> {
        match extension {
            ".zip" => Ok(Box::new(ZipDataIngestor::new(self.settings.processed_dir()))),
            ".csv" | ".tsv" => Ok(Box::new(DelimitedFileIngestor)),
            other => Err(IngestError::UnsupportedExtension(other.to_string())),
        }
    }

    pub fn get_ingestor_for_path(&self, path: &Path) -> Result<Box<dyn DataIngestor>> {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        self.get_ingestor(&extension)
    }
}

impl Default for IngestorFactory {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
