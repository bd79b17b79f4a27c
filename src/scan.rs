use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use derivative::Derivative;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::base::Record;
use crate::error::{Result, ScanError};
use crate::logging::chunk_progress;
use crate::parallel::{open_source, ParallelScanCoordinator};
use crate::planner::{ChunkDescriptor, ChunkPlanner, LineSurvey};
use crate::reader::ChunkReader;
use crate::top_k::TopKCollector;

/// How workers reach the first line of their chunk
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SkipStrategy {
    /// Read and discard the preceding lines
    #[default]
    Linear,
    /// Seek to a byte offset recorded while counting lines
    ByteOffset,
}

#[derive(Derivative, Serialize, Deserialize, Clone, Debug)]
#[derivative(Default)]
pub struct ScanOptions {
    /// Number of records to keep
    #[derivative(Default(value = "10"))]
    pub top: usize,

    /// Number of lines per chunk
    /// (0 means a sequential scan of the whole file)
    #[derivative(Default(value = "0"))]
    pub chunk_size: usize,

    pub skip: SkipStrategy,

    /// Show a progress bar over chunks
    pub progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    Sequential,
    Chunked(NonZeroUsize),
}

/// Reads a file and keeps the records with the largest scores
pub struct TopRecordsScanner {
    path: PathBuf,
    options: ScanOptions,
}

impl TopRecordsScanner {
    pub fn new(path: &Path, options: ScanOptions) -> Self {
        Self {
            path: path.to_path_buf(),
            options,
        }
    }

    pub fn mode(&self) -> ScanMode {
        match NonZeroUsize::new(self.options.chunk_size) {
            Some(chunk_size) => ScanMode::Chunked(chunk_size),
            None => ScanMode::Sequential,
        }
    }

    /// Returns the top records, sorted by decreasing score
    pub async fn process_file(&self) -> Result<Vec<Record>> {
        let start = Instant::now();
        let (collector, read, chunks) = match self.mode() {
            ScanMode::Sequential => {
                if self.options.skip != SkipStrategy::Linear {
                    warn!("Byte offsets are only used by chunked scans");
                }
                let path = self.path.clone();
                let top = self.options.top;
                let (collector, read) = tokio::task::spawn_blocking(move || scan_sequential(&path, top))
                    .await
                    .map_err(|e| ScanError::WorkerFailure(e.to_string()))??;
                (collector, read, 1)
            }
            ScanMode::Chunked(chunk_size) => self.scan_chunked(chunk_size).await?,
        };

        info!(
            "Read {} records from {} ({} chunks) in {:.2?}; kept {}",
            read,
            self.path.display(),
            chunks,
            start.elapsed(),
            collector.len()
        );
        Ok(collector.into_sorted_vec())
    }

    /// Same as [`process_file`](Self::process_file), on a dedicated runtime
    pub fn process_file_blocking(&self) -> Result<Vec<Record>> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.process_file())
    }

    async fn scan_chunked(&self, chunk_size: NonZeroUsize) -> Result<(TopKCollector, usize, usize)> {
        let path = self.path.clone();
        let indexed = self.options.skip == SkipStrategy::ByteOffset;
        let survey = tokio::task::spawn_blocking(move || LineSurvey::from_path(&path, chunk_size, indexed))
            .await
            .map_err(|e| ScanError::WorkerFailure(e.to_string()))??;

        let chunks = ChunkPlanner::new(chunk_size).plan_survey(&survey);
        let chunk_count = chunks.len();
        let coordinator = ParallelScanCoordinator::new(&self.path)
            .with_progress(chunk_progress(chunk_count, self.options.progress));
        info!(
            "{} lines in {} chunks of {} lines ({} workers)",
            survey.total_lines,
            chunk_count,
            chunk_size,
            coordinator.workers()
        );

        let mut collector = TopKCollector::new(self.options.top);
        let mut read = 0;
        coordinator
            .scan(chunks, |output| {
                read += output.records.len();
                collector.extend(output.records);
            })
            .await?;

        Ok((collector, read, chunk_count))
    }
}

/// Streams the whole file into a collector, returns it with the number of
/// records read
fn scan_sequential(path: &Path, top: usize) -> Result<(TopKCollector, usize)> {
    let chunk = ChunkDescriptor::whole_file();
    let reader = ChunkReader::new(open_source(path)?, chunk.start_line, chunk.line_count);

    let mut collector = TopKCollector::new(top);
    let mut read = 0;
    for record in reader {
        collector.ingest(record?);
        read += 1;
    }
    debug!("Sequential scan done ({} records)", read);
    Ok((collector, read))
}
