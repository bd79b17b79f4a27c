//! Parses a line range of an input stream into records

use std::io::BufRead;
use std::iter::FusedIterator;

use log::debug;

use crate::base::{LineNumber, Record, Score};
use crate::error::{Result, ScanError};

/// Parses one raw line (terminator included or not) into a record.
///
/// The line is split on its last whitespace run: the key is everything
/// before, the score everything after. `line_number` (1-based) is only
/// used to report errors.
pub fn parse_line(raw: &[u8], line_number: LineNumber) -> Result<Record> {
    let malformed = || ScanError::MalformedLine {
        line_number,
        line: String::from_utf8_lossy(raw)
            .trim_end_matches(&['\n', '\r'][..])
            .to_string(),
    };

    let line = std::str::from_utf8(raw).map_err(|_| malformed())?.trim_end();
    let split = line.rfind(char::is_whitespace).ok_or_else(malformed)?;

    let key = line[..split].trim_end();
    if key.is_empty() {
        return Err(malformed());
    }
    let score: Score = line[split..].trim_start().parse().map_err(|_| malformed())?;

    Ok(Record::new(score, key))
}

/// Lazy sequence of records read from a range of lines.
///
/// The reader first discards `start_line` lines, then parses at most
/// `line_count` lines (or up to EOF when `None`). It stops at the first
/// malformed line or I/O error, after yielding that error.
pub struct ChunkReader<R> {
    reader: R,

    /// Lines still to be discarded
    skip: LineNumber,

    /// Lines still to be parsed (None = until EOF)
    remaining: Option<usize>,

    /// Number of lines consumed so far (absolute position in the file)
    line_number: LineNumber,

    buffer: Vec<u8>,
    done: bool,
}

impl<R: BufRead> ChunkReader<R> {
    /// Reader over a stream positioned at the start of the input
    pub fn new(reader: R, start_line: LineNumber, line_count: Option<usize>) -> Self {
        Self {
            reader,
            skip: start_line,
            remaining: line_count,
            line_number: 0,
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Reader over a stream already positioned at the start of `first_line`
    /// (no line is skipped, `first_line` is used for error reporting)
    pub fn positioned(reader: R, first_line: LineNumber, line_count: Option<usize>) -> Self {
        Self {
            line_number: first_line,
            ..Self::new(reader, 0, line_count)
        }
    }

    /// Number of lines consumed (skipped or parsed) so far
    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    /// Reads the next line into the buffer, returns false on EOF
    fn read_line(&mut self) -> std::io::Result<bool> {
        self.buffer.clear();
        let n = self.reader.read_until(b'\n', &mut self.buffer)?;
        Ok(n > 0)
    }

    fn skip_lines(&mut self) -> std::io::Result<()> {
        while self.skip > 0 {
            if !self.read_line()? {
                debug!(
                    "EOF after skipping {} lines ({} left to skip)",
                    self.line_number, self.skip
                );
                self.done = true;
                break;
            }
            self.skip -= 1;
            self.line_number += 1;
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for ChunkReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Err(e) = self.skip_lines() {
            self.done = true;
            return Some(Err(e.into()));
        }
        if self.done || self.remaining == Some(0) {
            self.done = true;
            return None;
        }

        match self.read_line() {
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                self.line_number += 1;
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                let record = parse_line(&self.buffer, self.line_number);
                if record.is_err() {
                    self.done = true;
                }
                Some(record)
            }
        }
    }
}

impl<R: BufRead> FusedIterator for ChunkReader<R> {}
