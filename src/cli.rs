//! Command-line argument definitions for `logmerge`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::decorate::Color;
use crate::merge::ErrorPolicy;

/// Merge multiple log files, from different sources, preserving order.
///
/// Each file must already be in chronological order. Lines without a
/// recognised timestamp stay attached to the entry above them.
#[derive(Debug, Parser)]
#[command(name = "logmerge", version, about, long_about = None)]
pub struct Cli {
    /// Log files to merge, in tie-break order. `-` reads stdin.
    #[arg(required = true, num_args = 2..)]
    pub logfiles: Vec<PathBuf>,

    /// Tags prefixed to the entries of each file, in file order.
    ///
    /// Files beyond the last tag get `log<N>`.
    #[arg(short = 'p', long, num_args = 1..)]
    pub prefix: Vec<String>,

    /// Suppress all tags.
    #[arg(long)]
    pub no_prefix: bool,

    /// Regex whose first capture group is the timestamp.
    ///
    /// Checked before the built-in notations. Requires `--format`.
    #[arg(short = 'r', long, requires = "format")]
    pub regex: Option<String>,

    /// strftime format used to parse the `--regex` capture. UTC unless the
    /// format includes an offset.
    #[arg(short = 'f', long, requires = "regex")]
    pub format: Option<String>,

    /// Control color output.
    ///
    /// `auto` (the default) enables colors only when stdout is a TTY and
    /// `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum)]
    pub color: Option<ColorMode>,

    /// Colors for each file, in file order: a name (`red`, `bright_cyan`) or
    /// an xterm index `0`-`255`.
    #[arg(long, num_args = 1.., value_parser = parse_color_arg)]
    pub colors: Vec<Color>,

    /// Leading spaces or tabs tolerated before a timestamp.
    #[arg(long)]
    pub margin: Option<usize>,

    /// What to do when a file fails to read mid-merge.
    #[arg(long, value_enum)]
    pub on_error: Option<ErrorPolicy>,

    /// Warn about entries stamped earlier than the entry before them.
    #[arg(long)]
    pub check_order: bool,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log diagnostics to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Enable colors only when stdout is a TTY.
    Auto,
    /// Always enable colors.
    Always,
    /// Never enable colors.
    Never,
}

impl ColorMode {
    /// Parse the config-file spelling; unknown values fall back to `auto`.
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::Auto,
        }
    }
}

fn parse_color_arg(s: &str) -> Result<Color, String> {
    Color::parse(s).map_err(|e| e.to_string())
}
