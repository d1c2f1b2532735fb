/// housing-ingest library crate.
///
/// Turns raw house-price dataset files (ZIP archives of CSV/TSV, or bare
/// delimited files) into typed in-memory tables, plus the inspection tools
/// used while preparing them.
///
/// The binary entry point (src/main.rs) uses these same modules.
pub mod config;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod reader;
pub mod sniff;
pub mod steps;
pub mod tools;
pub mod utils;

pub use error::{IngestError, Result};
pub use frame::{Cell, Column, DType, Frame, FrameSummary};
pub use ingest::{DataIngestor, IngestOptions, IngestorFactory, ZipDataIngestor};
