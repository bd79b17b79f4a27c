//! Splits an input file into line-aligned chunks

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::Path;

use log::debug;

use crate::base::LineNumber;
use crate::error::{Result, ScanError};

/// A contiguous range of lines processed by one worker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// Position of the chunk in the plan
    pub index: usize,

    /// First line of the chunk (0-based)
    pub start_line: LineNumber,

    /// Number of lines (None = until EOF)
    pub line_count: Option<usize>,

    /// Byte position of `start_line`, when known
    pub byte_offset: Option<u64>,
}

impl ChunkDescriptor {
    /// The whole input as a single chunk
    pub fn whole_file() -> Self {
        Self {
            index: 0,
            start_line: 0,
            line_count: None,
            byte_offset: None,
        }
    }
}

impl fmt::Display for ChunkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_count {
            Some(count) => write!(f, "#{} [{}, +{})", self.index, self.start_line, count),
            None => write!(f, "#{} [{}, EOF)", self.index, self.start_line),
        }
    }
}

/// Result of a full pass over the input
#[derive(Clone, Debug, Default)]
pub struct LineSurvey {
    /// Total number of lines (a last line without newline counts)
    pub total_lines: LineNumber,

    /// Byte offsets of lines 0, C, 2C, ... (empty when not indexed)
    pub chunk_offsets: Vec<u64>,
}

impl LineSurvey {
    /// Counts the lines of a stream. If `index_offsets` is true, also
    /// records the byte offset of every line whose number is a multiple of
    /// `chunk_size`.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        chunk_size: NonZeroUsize,
        index_offsets: bool,
    ) -> Result<Self> {
        let mut survey = Self::default();
        let mut buffer = Vec::new();
        let mut position = 0u64;

        loop {
            buffer.clear();
            let n = reader.read_until(b'\n', &mut buffer)?;
            if n == 0 {
                break;
            }
            if index_offsets && survey.total_lines % chunk_size.get() == 0 {
                survey.chunk_offsets.push(position);
            }
            survey.total_lines += 1;
            position += n as u64;
        }

        debug!(
            "Surveyed {} lines ({} bytes, {} offsets)",
            survey.total_lines,
            position,
            survey.chunk_offsets.len()
        );
        Ok(survey)
    }

    pub fn from_path(path: &Path, chunk_size: NonZeroUsize, index_offsets: bool) -> Result<Self> {
        let file = File::open(path).map_err(|source| ScanError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), chunk_size, index_offsets)
    }
}

/// Partitions `[0, T)` into chunks of `chunk_size` lines
#[derive(Clone, Copy, Debug)]
pub struct ChunkPlanner {
    chunk_size: NonZeroUsize,
}

impl ChunkPlanner {
    pub fn new(chunk_size: NonZeroUsize) -> Self {
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Chunks `(0, C), (C, C), ...` covering `total_lines`. The last chunk
    /// may extend past the end of the file.
    pub fn plan(&self, total_lines: LineNumber) -> Vec<ChunkDescriptor> {
        let chunk_size = self.chunk_size.get();
        (0..total_lines)
            .step_by(chunk_size)
            .enumerate()
            .map(|(index, start_line)| ChunkDescriptor {
                index,
                start_line,
                line_count: Some(chunk_size),
                byte_offset: None,
            })
            .collect()
    }

    /// Same as [`plan`](Self::plan), with the byte offsets recorded by the
    /// survey attached to each chunk
    pub fn plan_survey(&self, survey: &LineSurvey) -> Vec<ChunkDescriptor> {
        let mut chunks = self.plan(survey.total_lines);
        if !survey.chunk_offsets.is_empty() {
            debug_assert!(
                survey.chunk_offsets.len() == chunks.len(),
                "Survey offsets ({}) do not match the plan ({} chunks)",
                survey.chunk_offsets.len(),
                chunks.len()
            );
            for (chunk, offset) in chunks.iter_mut().zip(survey.chunk_offsets.iter()) {
                chunk.byte_offset = Some(*offset);
            }
        }
        chunks
    }
}
