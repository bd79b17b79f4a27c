use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};

use top_records::logging::{self, LogConfig};
use top_records::{Record, ScanOptions, SkipStrategy, TopRecordsScanner};

#[derive(Parser, Debug)]
#[command(
    name = "top-records",
    version,
    about = "Process a file to find the keys with the largest values"
)]
struct Args {
    /// The path of the file to process
    file_path: PathBuf,

    /// Number of top records to retrieve
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Number of lines per chunk (0 = sequential scan)
    #[arg(long = "chunk-size", default_value_t = 0)]
    chunk_size: usize,

    /// Seek to chunk starts (byte offsets recorded while counting lines)
    /// instead of skipping lines
    #[arg(long = "indexed-seek")]
    indexed_seek: bool,

    /// Print the score after each key
    #[arg(long = "with-scores", conflicts_with = "json")]
    with_scores: bool,

    /// Print the records as a JSON array
    #[arg(long)]
    json: bool,

    /// Show a progress bar (chunked scans)
    #[arg(long)]
    progress: bool,

    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            top: self.top,
            chunk_size: self.chunk_size,
            skip: if self.indexed_seek {
                SkipStrategy::ByteOffset
            } else {
                SkipStrategy::Linear
            },
            progress: self.progress,
        }
    }
}

fn write_records(out: &mut impl Write, records: &[Record], args: &Args) -> std::io::Result<()> {
    if args.json {
        serde_json::to_writer_pretty(&mut *out, records)?;
        writeln!(out)?;
        return Ok(());
    }
    for record in records {
        if args.with_scores {
            writeln!(out, "{} {}", record.key, record.score)?;
        } else {
            writeln!(out, "{}", record.key)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&LogConfig::from_level_name(&args.log_level));

    let options = args.scan_options();
    debug!(
        "Options: {}",
        serde_json::to_string(&options).unwrap_or_default()
    );

    let scanner = TopRecordsScanner::new(&args.file_path, options);
    let records = match scanner.process_file().await {
        Ok(records) => records,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_records(&mut out, &records, &args) {
        error!("Error while writing the results: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
