//! One-entry lookahead over an [`EntryAssembler`].
//!
//! The merge loop compares sources through [`SourceCursor::peek_instant`]
//! and only consumes with [`SourceCursor::take`].

use std::io::BufRead;

use log::{debug, warn};

use crate::entry::{Entry, EntryAssembler};
use crate::error::MergeError;
use crate::timestamp::Instant;

pub struct SourceCursor<R> {
    assembler: EntryAssembler<R>,
    lookahead: Option<Entry>,
    error: Option<MergeError>,
    check_order: bool,
    out_of_order: usize,
}

impl<R: BufRead> SourceCursor<R> {
    /// Wrap `assembler` and pre-fetch its first entry.
    ///
    /// With `check_order` set, an entry stamped earlier than its predecessor
    /// is logged. It is still delivered in source order.
    pub fn new(assembler: EntryAssembler<R>, check_order: bool) -> Self {
        let mut cursor = Self {
            assembler,
            lookahead: None,
            error: None,
            check_order,
            out_of_order: 0,
        };
        cursor.refill(None);
        cursor
    }

    pub fn name(&self) -> &str {
        self.assembler.name()
    }

    /// Instant of the next undelivered entry, `None` once exhausted.
    pub fn peek_instant(&self) -> Option<Instant> {
        self.lookahead.as_ref().map(|entry| entry.instant)
    }

    /// Hand out the buffered entry and buffer the following one.
    ///
    /// Returns `None` only when [`peek_instant`](Self::peek_instant) does.
    pub fn take(&mut self) -> Option<Entry> {
        let entry = self.lookahead.take()?;
        self.refill(Some(entry.instant));
        Some(entry)
    }

    /// Read error hit while refilling, if any. The cursor is exhausted
    /// after a read error.
    pub fn take_error(&mut self) -> Option<MergeError> {
        self.error.take()
    }

    /// How many entries were seen stamped earlier than their predecessor.
    pub const fn out_of_order(&self) -> usize {
        self.out_of_order
    }

    fn refill(&mut self, previous: Option<Instant>) {
        match self.assembler.next() {
            Some(Ok(entry)) => {
                if self.check_order
                    && let Some(previous) = previous
                    && entry.instant < previous
                {
                    self.out_of_order += 1;
                    warn!(
                        "{}: line {} is stamped {} but follows an entry stamped {}",
                        self.name(),
                        entry.line_number,
                        entry.instant,
                        previous
                    );
                }
                self.lookahead = Some(entry);
            }
            Some(Err(err)) => {
                debug!("{}: read failed after {} lines", self.name(), self.assembler.lines_read());
                self.error = Some(err);
            }
            None => {
                debug!("{}: exhausted after {} lines", self.name(), self.assembler.lines_read());
            }
        }
    }
}
