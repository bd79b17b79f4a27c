//! Logger and progress bar setup.
//!
//! Nothing here is called by the scanning code itself: the binary builds the
//! logger from an explicit [`LogConfig`], and progress bars are handed to the
//! coordinator by the scanner.

use std::io::Write;

use chrono::{Local, NaiveDateTime};
use env_logger::fmt::Formatter;
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, Record};

/// Month, day and time (local time zone)
const TIMESTAMP_FORMAT: &str = "%m-%d %H:%M:%S";

const DEFAULT_PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})";

/// Logger configuration
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

impl LogConfig {
    /// Parses a level name (case insensitive); unknown names fall back to info
    pub fn from_level_name(name: &str) -> Self {
        Self {
            level: name.trim().parse().unwrap_or(LevelFilter::Info),
        }
    }
}

/// Writes `[MM-DD HH:MM:SS] p<pid> {file:line} LEVEL - message`
fn write_line<W: Write>(out: &mut W, now: NaiveDateTime, record: &Record) -> std::io::Result<()> {
    writeln!(
        out,
        "[{}] p{} {{{}:{}}} {} - {}",
        now.format(TIMESTAMP_FORMAT),
        std::process::id(),
        record.file().unwrap_or("?"),
        record.line().unwrap_or(0),
        record.level(),
        record.args()
    )
}

fn format_record(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    write_line(buf, Local::now().naive_local(), record)
}

fn builder(config: &LogConfig) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level).format(format_record);
    builder
}

/// Installs the logger (only the first call has an effect)
pub fn init(config: &LogConfig) {
    let _ = builder(config).try_init();
}

fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(DEFAULT_PROGRESS_TEMPLATE)
        .progress_chars("=> ")
}

/// Progress bar over `chunks` chunks (hidden if not `visible`)
pub fn chunk_progress(chunks: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(chunks as u64);
    progress.set_style(pb_style());
    progress
}
