//! Pipeline steps owned by this project.

use std::path::Path;
use std::time::Instant;

use tracing::{info, info_span};

use crate::config::Settings;
use crate::error::Result;
use crate::frame::Frame;
use crate::ingest::{IngestOptions, IngestorFactory};

/// Ingest `file_path` with the ingestor matching its extension.
pub fn data_ingestion_step(file_path: &Path, settings: &Settings) -> Result<Frame> {
    let span = info_span!("step", name = "data_ingestion");
    let _enter = span.enter();

    let started = Instant::now();
    let ingestor = IngestorFactory::new(settings.clone()).get_ingestor_for_path(file_path)?;
    let frame = ingestor.ingest(file_path, &IngestOptions::default())?;

    let (rows, cols) = frame.shape();
    info!(
        path = %file_path.display(),
        rows,
        cols,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "data ingestion step completed"
    );
    Ok(frame)
}
