//! Finds the records with the largest scores in a large text file.
//!
//! Each line of the input holds a key and an integer score, separated by
//! the last whitespace run of the line. Files are either read sequentially,
//! or cut into chunks of lines read in parallel (see [`parallel`]); in both
//! cases the records go through a bounded [`TopKCollector`].
//!
//! ```no_run
//! use std::path::Path;
//! use top_records::{ScanOptions, TopRecordsScanner};
//!
//! let options = ScanOptions { top: 3, chunk_size: 100_000, ..Default::default() };
//! let scanner = TopRecordsScanner::new(Path::new("scores.txt"), options);
//! for record in scanner.process_file_blocking()? {
//!     println!("{}", record.key);
//! }
//! # Ok::<(), top_records::ScanError>(())
//! ```

pub mod base;
pub mod error;
pub mod logging;
pub mod parallel;
pub mod planner;
pub mod reader;
pub mod scan;
pub mod top_k;

pub use base::{Record, Score};
pub use error::{Result, ScanError};
pub use scan::{ScanMode, ScanOptions, SkipStrategy, TopRecordsScanner};
pub use top_k::TopKCollector;
