//! K-way merge of many sources into one chronologically ordered stream.
//!
//! The frontier is a min-heap keyed by `(instant, source order)`: on equal
//! instants the source listed first wins, which makes the output stable and
//! reproducible. Each step pops the earliest cursor, takes its entry, renders
//! it with the source's [`Decoration`], and pushes the cursor back with its
//! new key unless it is exhausted. Memory is one buffered entry per live
//! source.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::io::BufRead;

use clap::ValueEnum;
use log::{debug, warn};

use crate::cursor::SourceCursor;
use crate::decorate::Decoration;
use crate::entry::{Entry, EntryAssembler};
use crate::error::MergeError;
use crate::timestamp::{Extractor, Instant};

/// What to do when one source fails to read mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorPolicy {
    /// Report the error and stop the whole merge.
    #[default]
    FailFast,
    /// Report the error, drop that source, and keep merging the rest.
    Skip,
}

impl ErrorPolicy {
    /// Parse the config-file spelling (`fail-fast` or `skip`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "fail-fast" | "failfast" => Some(Self::FailFast),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// One input: an identifier, a line reader, and how to decorate its entries.
pub struct Source<R> {
    pub name: String,
    pub reader: R,
    pub decoration: Decoration,
}

impl<R> Source<R> {
    pub fn new(name: impl Into<String>, reader: R, decoration: Decoration) -> Self {
        Self {
            name: name.into(),
            reader,
            decoration,
        }
    }
}

/// Settings shared by every source of one merge.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub extractor: Extractor,
    pub on_error: ErrorPolicy,
    /// Log entries stamped earlier than their predecessor in the same source.
    pub check_order: bool,
}

/// An entry picked from the frontier, with its rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Position of the source in the input list.
    pub source: usize,
    pub entry: Entry,
    /// Decorated text, every line terminated by `\n`.
    pub rendered: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierKey {
    instant: Instant,
    order: usize,
}

/// Pull-based merge over a fixed list of sources.
///
/// Yields `Ok(Emission)` in global order. A source read error is yielded as
/// `Err` at the point it is hit; under [`ErrorPolicy::FailFast`] iteration
/// ends right after it, under [`ErrorPolicy::Skip`] the remaining sources
/// keep merging. Readers are dropped as soon as their source is exhausted,
/// fails, or the engine itself is dropped.
pub struct MergeEngine<R> {
    cursors: Vec<Option<SourceCursor<R>>>,
    decorations: Vec<Decoration>,
    frontier: BinaryHeap<Reverse<FrontierKey>>,
    errors: VecDeque<MergeError>,
    policy: ErrorPolicy,
    halted: bool,
}

/// Merge `sources` in order of the timestamps of their entries.
pub fn merge<R: BufRead>(sources: Vec<Source<R>>, options: &MergeOptions) -> MergeEngine<R> {
    MergeEngine::new(sources, options)
}

impl<R: BufRead> MergeEngine<R> {
    /// Open a cursor per source and pre-fetch one entry from each.
    pub fn new(sources: Vec<Source<R>>, options: &MergeOptions) -> Self {
        let count = sources.len();
        let mut engine = Self {
            cursors: Vec::with_capacity(count),
            decorations: Vec::with_capacity(count),
            frontier: BinaryHeap::with_capacity(count),
            errors: VecDeque::new(),
            policy: options.on_error,
            halted: false,
        };

        for (order, source) in sources.into_iter().enumerate() {
            debug!("opening source {order}: {}", source.name);
            let assembler =
                EntryAssembler::new(source.name, source.reader, options.extractor.clone());
            engine.decorations.push(source.decoration);
            engine.cursors.push(None);
            engine.admit(order, SourceCursor::new(assembler, options.check_order));
        }
        engine
    }

    /// Number of sources that still have entries to deliver.
    pub fn live_sources(&self) -> usize {
        self.frontier.len()
    }

    /// Put `cursor` (back) on the frontier, or release it when exhausted.
    fn admit(&mut self, order: usize, mut cursor: SourceCursor<R>) {
        if let Some(err) = cursor.take_error() {
            self.report(err);
        }
        if self.halted {
            return;
        }
        match cursor.peek_instant() {
            Some(instant) => {
                self.frontier.push(Reverse(FrontierKey { instant, order }));
                self.cursors[order] = Some(cursor);
            }
            None => {
                debug!("source {order} ({}) done", cursor.name());
            }
        }
    }

    fn report(&mut self, err: MergeError) {
        match self.policy {
            ErrorPolicy::FailFast => {
                self.errors.push_back(err);
                self.halt();
            }
            ErrorPolicy::Skip => {
                warn!("dropping source: {err}");
                self.errors.push_back(err);
            }
        }
    }

    /// Stop merging and release every reader.
    fn halt(&mut self) {
        self.halted = true;
        self.frontier.clear();
        self.cursors.iter_mut().for_each(|slot| *slot = None);
    }
}

impl<R: BufRead> Iterator for MergeEngine<R> {
    type Item = Result<Emission, MergeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.errors.pop_front() {
            return Some(Err(err));
        }
        if self.halted {
            return None;
        }

        let Reverse(key) = self.frontier.pop()?;
        let mut cursor = self.cursors[key.order].take()?;
        let entry = cursor.take()?;
        self.admit(key.order, cursor);

        let mut rendered = String::new();
        self.decorations[key.order].render(&entry, &mut rendered);
        Some(Ok(Emission {
            source: key.order,
            entry,
            rendered,
        }))
    }
}
