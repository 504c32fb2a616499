//! `logmerge`: merge log files from different sources into one stream.
//!
//! Every source is assumed to be in chronological order on its own, but the
//! sources may stamp their lines in different notations. Lines are grouped
//! into entries (a timestamped line plus its continuation lines), and the
//! entries of all sources are merged by timestamp with a stable tie-break on
//! source order.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use logmerge::{Decoration, MergeEngine, MergeOptions, Source};
//!
//! let app = Source::new(
//!     "app",
//!     Cursor::new("2023-01-05 10:00:01,000 request done\n"),
//!     Decoration::new(Some("[APP]".to_string()), None),
//! );
//! let db = Source::new(
//!     "db",
//!     Cursor::new("1672912800.5 query start\n  SELECT 1\n"),
//!     Decoration::default(),
//! );
//!
//! let out: String = MergeEngine::new(vec![app, db], &MergeOptions::default())
//!     .map(|emission| emission.unwrap().rendered)
//!     .collect();
//! assert_eq!(
//!     out,
//!     "1672912800.5 query start\n  SELECT 1\n[APP] 2023-01-05 10:00:01,000 request done\n"
//! );
//! ```

pub mod cli;
pub mod config;
pub mod cursor;
pub mod decorate;
pub mod entry;
pub mod error;
pub mod merge;
pub mod timestamp;

// Re-export primary API types for convenience.
pub use config::Config;
pub use cursor::SourceCursor;
pub use decorate::{Color, Decoration};
pub use entry::{Entry, EntryAssembler};
pub use error::MergeError;
pub use merge::{Emission, ErrorPolicy, MergeEngine, MergeOptions, Source, merge};
pub use timestamp::{CustomMatcher, Extracted, Extractor, FormatMatcher, Instant};
