//! Grouping of raw lines into log entries.
//!
//! An [`Entry`] is a timestamped line followed by every continuation line up
//! to the next timestamped line. Lines before the first timestamp of a
//! source form a leading entry stamped [`Instant::BEGINNING`], so every input
//! line ends up in exactly one entry.

use std::io::BufRead;

use crate::error::MergeError;
use crate::timestamp::{Extractor, Instant};

/// One log entry: a first line carrying the timestamp plus its continuation
/// lines, all stored without line terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Instant parsed from the first line.
    pub instant: Instant,
    /// Raw lines in source order. Never empty.
    pub lines: Vec<String>,
    /// 1-based line number of the first line within its source.
    pub line_number: usize,
}

impl Entry {
    fn start(instant: Instant, line: String, line_number: usize) -> Self {
        Self {
            instant,
            lines: vec![line],
            line_number,
        }
    }

    /// True for the leading entry made of lines that precede any timestamp.
    pub fn is_leading(&self) -> bool {
        self.instant == Instant::BEGINNING
    }
}

/// Lazily reads lines from one source and yields [`Entry`] values.
///
/// Forward-only: each call to [`next`](Iterator::next) reads just far enough
/// to close the pending entry. After the reader is exhausted or fails the
/// iterator stays finished.
pub struct EntryAssembler<R> {
    name: String,
    reader: R,
    extractor: Extractor,
    pending: Option<Entry>,
    failed: Option<MergeError>,
    line_number: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> EntryAssembler<R> {
    pub fn new(name: impl Into<String>, reader: R, extractor: Extractor) -> Self {
        Self {
            name: name.into(),
            reader,
            extractor,
            pending: None,
            failed: None,
            line_number: 0,
            buf: Vec::with_capacity(256),
            done: false,
        }
    }

    /// Source identifier used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lines read so far.
    pub const fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Read one line without its terminator. Invalid UTF-8 is replaced
    /// rather than dropped.
    fn read_line(&mut self) -> Result<Option<String>, MergeError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| MergeError::SourceRead {
                source_name: self.name.clone(),
                line: self.line_number + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl<R: BufRead> Iterator for EntryAssembler<R> {
    type Item = Result<Entry, MergeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failed.take() {
            return Some(Err(err));
        }
        if self.done {
            return None;
        }

        loop {
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.done = true;
                    return self.pending.take().map(Ok);
                }
                Err(err) => {
                    self.done = true;
                    // Hand out what was already read; the error follows.
                    return match self.pending.take() {
                        Some(entry) => {
                            self.failed = Some(err);
                            Some(Ok(entry))
                        }
                        None => Some(Err(err)),
                    };
                }
            };

            match self.extractor.extract(&line) {
                Some(found) => {
                    let next = Entry::start(found.instant, line, self.line_number);
                    if let Some(finished) = self.pending.replace(next) {
                        return Some(Ok(finished));
                    }
                }
                None => match self.pending.as_mut() {
                    Some(entry) => entry.lines.push(line),
                    None => {
                        let leading = Entry::start(Instant::BEGINNING, line, self.line_number);
                        self.pending = Some(leading);
                    }
                },
            }
        }
    }
}
