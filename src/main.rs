use std::path::PathBuf;

use housing_ingest::config::Settings;
use housing_ingest::ingest::{IngestOptions, IngestorFactory};
use housing_ingest::{sniff, steps, tools, utils};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "housing-ingest",
    about = "Ingest house-price datasets from ZIP archives of CSV/TSV files",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Project root holding data/processed
    #[arg(long, env = "HOUSING_INGEST_ROOT", global = true)]
    data_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a dataset file and print its shape and columns
    Ingest {
        /// Path to the archive (or bare CSV/TSV) to ingest
        path: PathBuf,
        /// Extract into this directory instead of data/processed/<stem>
        #[arg(long, conflicts_with = "keep_extracted")]
        extract_dir: Option<PathBuf>,
        /// Extract into ./extracted_data
        #[arg(long, default_value_t = false)]
        keep_extracted: bool,
        /// Fail instead of concatenating several data files
        #[arg(long, default_value_t = false)]
        no_concat: bool,
        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print shape, leading column names and first rows of a delimited file
    Preview {
        /// Defaults to data/processed/Ames_Housing_Data.csv
        path: Option<PathBuf>,
        #[arg(long, default_value_t = tools::DEFAULT_PREVIEW_ROWS)]
        rows: usize,
        #[arg(long, default_value_t = tools::DEFAULT_PREVIEW_COLUMNS)]
        columns: usize,
    },
    /// Rewrite a TSV file as CSV
    Convert {
        /// Defaults to data/processed/Ames_Housing_Data.tsv
        #[arg(long)]
        src: Option<PathBuf>,
        /// Defaults to data/processed/Ames_Housing_Data.csv
        #[arg(long)]
        dst: Option<PathBuf>,
    },
    /// Show raw head lines and the detected delimiter of a file
    Sniff {
        /// Defaults to data/processed/Ames_Housing_Data.csv
        path: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        lines: usize,
    },
    /// Run the data ingestion pipeline step
    Step {
        file_path: PathBuf,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let settings = Settings::resolve(args.data_root.as_deref());
    info!(data_root = %settings.data_root.display(), "resolved settings");

    match args.command {
        Commands::Ingest {
            path,
            extract_dir,
            keep_extracted,
            no_concat,
            json,
        } => {
            let extract_dir =
                extract_dir.or_else(|| keep_extracted.then(|| PathBuf::from("extracted_data")));
            let options = IngestOptions {
                extract_dir,
                concat: !no_concat,
            };
            let ingestor = IngestorFactory::new(settings).get_ingestor_for_path(&path)?;
            let frame = ingestor
                .ingest(&path, &options)
                .with_context(|| format!("failed to ingest {}", path.display()))?;

            let summary = frame.summary();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("failed to encode summary")?
                );
            } else {
                utils::print_summary(&summary);
            }
        }
        Commands::Preview {
            path,
            rows,
            columns,
        } => {
            let path = path.unwrap_or_else(|| settings.default_csv());
            let preview = tools::preview(&path, rows, columns)
                .with_context(|| format!("failed to preview {}", path.display()))?;
            println!("{}", utils::render_preview(&preview));
        }
        Commands::Convert { src, dst } => {
            let src = src.unwrap_or_else(|| settings.default_tsv());
            let dst = dst.unwrap_or_else(|| settings.default_csv());
            let (rows, cols) = tools::convert_tsv_to_csv(&src, &dst)
                .with_context(|| format!("failed to convert {}", src.display()))?;
            println!(
                "Wrote {} rows x {} cols to {}",
                rows,
                cols,
                dst.display()
            );
        }
        Commands::Sniff { path, lines } => {
            let path = path.unwrap_or_else(|| settings.default_csv());
            let report = sniff::inspect(&path, lines)
                .with_context(|| format!("failed to inspect {}", path.display()))?;
            println!("{report}");
        }
        Commands::Step { file_path } => {
            let frame = steps::data_ingestion_step(&file_path, &settings)
                .context("data ingestion step failed")?;
            utils::print_summary(&frame.summary());
        }
    }

    Ok(())
}
