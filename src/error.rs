use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the ingestion library.
///
/// The binary wraps these in `anyhow` for reporting; library callers can match
/// on the variant to tell bad input apart from I/O trouble.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("the file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("the file at {} is not a valid zip file", .0.display())]
    NotAZip(PathBuf),

    #[error("no CSV/TSV files found in the zip archive")]
    NoDataFiles,

    #[error("multiple data files ({0}) found in the zip archive; enable concat to combine them")]
    MultipleDataFiles(usize),

    #[error("no ingestor available for the file type of {0:?}")]
    UnsupportedExtension(String),

    #[error("no columns to parse from {}", .0.display())]
    EmptyData(PathBuf),

    #[error("expected {expected} fields in line {line} of {}, saw {found}", .path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("columns have mismatched lengths: {0}")]
    ShapeMismatch(String),

    #[error("nothing to concatenate")]
    EmptyConcat,

    #[error("column {0:?} is not numeric")]
    NonNumericColumn(String),

    #[error("could not determine delimiter")]
    SniffFailed,

    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to extract {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
