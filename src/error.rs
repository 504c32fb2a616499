//! Error types for `logmerge`.
//!
//! Uses [`thiserror`] for ergonomic error derivation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in `logmerge`.
///
/// Maps to exit codes via [`exit_code`](Self::exit_code): setup problems
/// (configuration, patterns, unopenable inputs) → exit 1, I/O during the
/// merge → exit 2.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Configuration error (invalid flag combination, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A user-supplied timestamp regex failed to compile.
    #[error("invalid timestamp pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An input file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading one source failed part-way through.
    #[error("read error in {source_name} near line {line}: {source}")]
    SourceRead {
        source_name: String,
        /// 1-based number of the line that could not be read.
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing the merged stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Toml(_) | Self::Pattern(_) | Self::Open { .. } => 1,
            Self::SourceRead { .. } | Self::Io(_) => 2,
        }
    }

    /// Name of the source this error belongs to, if any.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::SourceRead { source_name, .. } => Some(source_name),
            _ => None,
        }
    }
}
