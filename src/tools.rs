//! Developer helpers for looking at and reshaping processed dataset files.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{IngestError, Result};
use crate::frame::{Frame, FrameSummary};
use crate::reader::{Delimiter, read_delimited, write_csv};

pub const DEFAULT_PREVIEW_ROWS: usize = 2;
pub const DEFAULT_PREVIEW_COLUMNS: usize = 10;

#[derive(Debug, Clone)]
pub struct Preview {
    pub path: PathBuf,
    pub summary: FrameSummary,
    /// The first `max_columns` column names.
    pub columns: Vec<String>,
    pub head: Frame,
}

/// Read a delimited file and keep its shape, leading column names and first rows.
pub fn preview(path: &Path, rows: usize, max_columns: usize) -> Result<Preview> {
    info!(path = %path.display(), "reading");
    let frame = read_delimited(path, Delimiter::for_path(path))?;
    let summary = frame.summary();
    let columns = summary.columns.iter().take(max_columns).cloned().collect();
    Ok(Preview {
        path: path.to_path_buf(),
        summary,
        columns,
        head: frame.head(rows),
    })
}

/// Re-encode a tab-separated file as comma-separated, returning `(rows, cols)`.
///
/// Values go through the same dtype inference as every other read, so integral
/// floats come out as `2.0` and NA tokens as empty fields.
pub fn convert_tsv_to_csv(src: &Path, dst: &Path) -> Result<(usize, usize)> {
    if !src.exists() {
        return Err(IngestError::NotFound(src.to_path_buf()));
    }
    info!(src = %src.display(), "reading");
    let frame = read_delimited(src, Delimiter::Tab)?;
    let shape = frame.shape();
    info!(rows = shape.0, cols = shape.1, "parsed source");

    write_csv(&frame, dst)?;
    info!(dst = %dst.display(), "wrote csv");
    Ok(shape)
}
