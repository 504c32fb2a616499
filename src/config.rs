//! Configuration management with TOML file support.
//!
//! Merges settings from three sources (highest precedence first):
//! 1. CLI flags
//! 2. Config file (`~/.config/logmerge/config.toml` or `$XDG_CONFIG_HOME/logmerge/config.toml`)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{Cli, ColorMode};
use crate::decorate::{Color, DEFAULT_PALETTE, Decoration};
use crate::error::MergeError;
use crate::merge::{ErrorPolicy, MergeOptions};
use crate::timestamp::{CustomMatcher, Extractor};

/// Runtime configuration merged from defaults, config file, and CLI arguments.
///
/// Use [`Config::from_cli`] to build from parsed CLI arguments, or
/// [`Config::default`] for built-in defaults (useful in tests and benchmarks).
#[derive(Debug, Clone)]
pub struct Config {
    /// Color output mode (auto/always/never).
    pub color_mode: ColorMode,
    /// Explicit tags, in source order.
    pub prefixes: Vec<String>,
    /// Suppress every tag, explicit or automatic.
    pub no_prefix: bool,
    /// Explicit colors, in source order.
    pub colors: Vec<Color>,
    /// Colors for sources beyond `colors`, cycled.
    pub palette: Vec<Color>,
    /// Leading whitespace tolerated before a timestamp.
    pub margin: usize,
    /// Read-error policy for the merge.
    pub on_error: ErrorPolicy,
    /// Warn about out-of-order entries within a source.
    pub check_order: bool,
    /// Custom timestamp regex (paired with `timestamp_format`).
    pub timestamp_regex: Option<String>,
    /// strftime format for `timestamp_regex`.
    pub timestamp_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            prefixes: Vec::new(),
            no_prefix: false,
            colors: Vec::new(),
            palette: DEFAULT_PALETTE.to_vec(),
            margin: 0,
            on_error: ErrorPolicy::FailFast,
            check_order: false,
            timestamp_regex: None,
            timestamp_format: None,
        }
    }
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file if present.
    ///
    /// Merge precedence: CLI flags > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, MergeError> {
        let mut config = Self::default();

        let config_path = cli.config.clone().unwrap_or_else(Self::default_config_path);
        if config_path.exists() {
            let file_config = FileConfig::load(&config_path)?;
            config.apply_file_config(file_config)?;
        } else if cli.config.is_some() {
            return Err(MergeError::Config(format!(
                "config file {} does not exist",
                config_path.display()
            )));
        }

        // CLI overrides
        if let Some(color) = cli.color {
            config.color_mode = color;
        }
        if !cli.prefix.is_empty() {
            config.prefixes.clone_from(&cli.prefix);
        }
        config.no_prefix |= cli.no_prefix;
        if !cli.colors.is_empty() {
            config.colors.clone_from(&cli.colors);
        }
        if let Some(margin) = cli.margin {
            config.margin = margin;
        }
        if let Some(policy) = cli.on_error {
            config.on_error = policy;
        }
        config.check_order |= cli.check_order;
        if cli.regex.is_some() {
            config.timestamp_regex.clone_from(&cli.regex);
            config.timestamp_format.clone_from(&cli.format);
        }

        config.validate()?;
        Ok(config)
    }

    /// Default config file path: `$XDG_CONFIG_HOME/logmerge/config.toml` or
    /// `~/.config/logmerge/config.toml`.
    fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("logmerge").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("logmerge")
                .join("config.toml")
        } else {
            PathBuf::from(".config/logmerge/config.toml")
        }
    }

    /// Apply settings from a parsed config file.
    fn apply_file_config(&mut self, file: FileConfig) -> Result<(), MergeError> {
        if let Some(color) = file.color {
            self.color_mode = ColorMode::from_str_loose(&color);
        }
        if let Some(no_prefix) = file.no_prefix {
            self.no_prefix = no_prefix;
        }
        if let Some(margin) = file.margin {
            self.margin = margin;
        }
        if let Some(policy) = file.on_error {
            self.on_error = ErrorPolicy::from_str_loose(&policy).ok_or_else(|| {
                MergeError::Config(format!(
                    "invalid on_error '{policy}': expected fail-fast or skip"
                ))
            })?;
        }
        if let Some(check_order) = file.check_order {
            self.check_order = check_order;
        }
        if let Some(palette) = file.palette {
            let palette = palette
                .iter()
                .map(|name| Color::parse(name))
                .collect::<Result<Vec<_>, _>>()?;
            if !palette.is_empty() {
                self.palette = palette;
            }
        }
        if let Some(timestamp) = file.timestamp {
            self.timestamp_regex = timestamp.regex;
            self.timestamp_format = timestamp.format;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), MergeError> {
        if self.timestamp_regex.is_some() != self.timestamp_format.is_some() {
            return Err(MergeError::Config(
                "timestamp regex and format must be given together".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the timestamp extractor: the custom matcher (if any) ahead of
    /// the built-in ones.
    pub fn extractor(&self) -> Result<Extractor, MergeError> {
        let custom = match (&self.timestamp_regex, &self.timestamp_format) {
            (Some(regex), Some(format)) => Some(CustomMatcher::new(regex, format)?),
            _ => None,
        };
        Ok(Extractor::new(custom, self.margin))
    }

    /// Options for [`MergeEngine`](crate::merge::MergeEngine).
    pub fn merge_options(&self) -> Result<MergeOptions, MergeError> {
        Ok(MergeOptions {
            extractor: self.extractor()?,
            on_error: self.on_error,
            check_order: self.check_order,
        })
    }

    /// Decoration for each of `count` sources.
    ///
    /// Without explicit tags and with color active, sources are told apart by
    /// color alone. Otherwise untagged sources get `log<N>` (1-based).
    pub fn decorations(&self, count: usize, use_color: bool) -> Vec<Decoration> {
        let tagged = !(self.no_prefix || (use_color && self.prefixes.is_empty()));
        (0..count)
            .map(|i| {
                let tag = tagged.then(|| {
                    self.prefixes
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("log{}", i + 1))
                });
                let color = use_color.then(|| self.color_for(i)).flatten();
                Decoration::new(tag, color)
            })
            .collect()
    }

    fn color_for(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied().or_else(|| {
            (!self.palette.is_empty()).then(|| self.palette[index % self.palette.len()])
        })
    }
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    color: Option<String>,
    no_prefix: Option<bool>,
    margin: Option<usize>,
    on_error: Option<String>,
    check_order: Option<bool>,
    palette: Option<Vec<String>>,
    timestamp: Option<TimestampConfig>,
}

#[derive(Debug, Deserialize)]
struct TimestampConfig {
    regex: Option<String>,
    format: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, MergeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MergeError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
