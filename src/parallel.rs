//! Chunked scan on a bounded pool of workers.
//!
//! Each worker opens its own handle on the source, positions itself at the
//! start of its chunk and parses the chunk with a [`ChunkReader`]. Chunk
//! results are handed to the caller in completion order.
//!
//! Without byte offsets, a worker reaches its chunk by reading and
//! discarding `start_line` lines: over a whole file of `T` lines cut in
//! chunks of `C` lines, this costs `O(T²/C)` line reads. Plans built from an
//! indexed [`LineSurvey`](crate::planner::LineSurvey) avoid this by seeking.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::available_parallelism;

use indicatif::ProgressBar;
use log::{debug, warn};
use tokio::task::JoinSet;

use crate::base::Record;
use crate::error::{Result, ScanError};
use crate::planner::ChunkDescriptor;
use crate::reader::ChunkReader;

/// Above this number of chunks, a linear-skip plan triggers a warning
pub const LINEAR_SKIP_WARNING_CHUNKS: usize = 1024;

/// Records read by one worker, in file order
#[derive(Debug)]
pub struct ChunkOutput {
    pub chunk: ChunkDescriptor,
    pub records: Vec<Record>,
}

/// Opens `path` for reading
pub(crate) fn open_source(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| ScanError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Number of linear-skip chunks in `chunks` when it is large enough to
/// deserve a warning
fn quadratic_skip_chunks(chunks: &[ChunkDescriptor]) -> Option<usize> {
    let linear = chunks.iter().filter(|c| c.byte_offset.is_none()).count();
    (linear > LINEAR_SKIP_WARNING_CHUNKS).then_some(linear)
}

/// Reads one chunk from a fresh handle on the source
pub fn read_chunk(path: &Path, chunk: &ChunkDescriptor) -> Result<Vec<Record>> {
    let mut reader = open_source(path)?;
    let records = match chunk.byte_offset {
        Some(offset) => {
            reader.seek(SeekFrom::Start(offset))?;
            ChunkReader::positioned(reader, chunk.start_line, chunk.line_count)
                .collect::<Result<Vec<_>>>()?
        }
        None => ChunkReader::new(reader, chunk.start_line, chunk.line_count)
            .collect::<Result<Vec<_>>>()?,
    };
    debug!("Chunk {} read ({} records)", chunk, records.len());
    Ok(records)
}

pub struct ParallelScanCoordinator {
    /// The source (opened by each worker)
    source: Arc<PathBuf>,

    /// Maximum number of chunks in flight
    workers: usize,

    progress: ProgressBar,
}

impl ParallelScanCoordinator {
    pub fn new(source: &Path) -> Self {
        Self {
            source: Arc::new(source.to_path_buf()),
            workers: available_parallelism().map(|n| n.get()).unwrap_or(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Sets the progress bar incremented after each chunk
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn dispatch(&self, tasks: &mut JoinSet<Result<ChunkOutput>>, chunk: ChunkDescriptor) {
        let source = self.source.clone();
        tasks.spawn_blocking(move || {
            let records = read_chunk(&source, &chunk)?;
            Ok(ChunkOutput { chunk, records })
        });
    }

    /// Reads all the chunks, calling `on_chunk` on the collecting task
    /// each time a worker completes.
    ///
    /// Returns the number of chunks read. On the first failure, the progress
    /// bar is abandoned, the error is returned and the results of workers
    /// still running are dropped.
    pub async fn scan<F>(&self, chunks: Vec<ChunkDescriptor>, mut on_chunk: F) -> Result<usize>
    where
        F: FnMut(ChunkOutput),
    {
        if let Some(linear) = quadratic_skip_chunks(&chunks) {
            warn!(
                "{} chunks use linear line skipping: the cost of skipping grows quadratically \
                 with the number of chunks (use byte offsets or larger chunks)",
                linear
            );
        }
        debug!(
            "Scanning {} chunks of {} with {} workers",
            chunks.len(),
            self.source.display(),
            self.workers
        );

        let mut pending = chunks.into_iter();
        let mut tasks = JoinSet::new();
        for chunk in pending.by_ref().take(self.workers) {
            self.dispatch(&mut tasks, chunk);
        }

        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            let output = match joined.map_err(|e| ScanError::WorkerFailure(e.to_string())) {
                Ok(Ok(output)) => output,
                Ok(Err(e)) | Err(e) => {
                    self.progress.abandon();
                    return Err(e);
                }
            };
            completed += 1;
            self.progress.inc(1);
            on_chunk(output);

            if let Some(chunk) = pending.next() {
                self.dispatch(&mut tasks, chunk);
            }
        }

        self.progress.finish();
        Ok(completed)
    }
}
