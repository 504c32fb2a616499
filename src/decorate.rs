//! Per-source tag and color decoration of emitted entries.
//!
//! Colors are xterm-256 indices rendered with [`owo_colors`]. Named colors
//! map onto the first sixteen indices.

use std::fmt::{self, Write};

use owo_colors::{OwoColorize, XtermColors};

use crate::entry::Entry;
use crate::error::MergeError;

/// Colors handed out to sources that have no explicit color, in order.
pub const DEFAULT_PALETTE: [Color; 12] = [
    Color(1),
    Color(2),
    Color(3),
    Color(4),
    Color(5),
    Color(6),
    Color(9),
    Color(10),
    Color(11),
    Color(12),
    Color(13),
    Color(14),
];

/// An xterm-256 foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u8);

impl Color {
    /// Parse a color name (`red`, `bright_cyan`, ...) or an index `0`-`255`.
    pub fn parse(s: &str) -> Result<Self, MergeError> {
        if let Ok(index) = s.parse::<u8>() {
            return Ok(Self(index));
        }
        let index = match s.to_lowercase().as_str() {
            "black" => 0,
            "red" => 1,
            "green" => 2,
            "yellow" => 3,
            "blue" => 4,
            "magenta" | "purple" => 5,
            "cyan" => 6,
            "white" => 7,
            "bright_black" | "gray" | "grey" => 8,
            "bright_red" => 9,
            "bright_green" => 10,
            "bright_yellow" => 11,
            "bright_blue" => 12,
            "bright_magenta" => 13,
            "bright_cyan" => 14,
            "bright_white" => 15,
            _ => {
                return Err(MergeError::Config(format!(
                    "unknown color '{s}': expected a name such as red or bright_cyan, or 0-255"
                )));
            }
        };
        Ok(Self(index))
    }

    fn xterm(self) -> XtermColors {
        XtermColors::from(self.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How one source's entries are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    /// Prefixed, followed by a space, to the first line of each entry.
    pub tag: Option<String>,
    /// Wraps the whole rendered entry.
    pub color: Option<Color>,
}

impl Decoration {
    pub fn new(tag: Option<String>, color: Option<Color>) -> Self {
        Self { tag, color }
    }

    /// Render `entry` into `out`, one `\n`-terminated line per entry line.
    ///
    /// Only the first line is tagged. With a color the start sequence comes
    /// before the first line and the reset sequence before the final newline.
    pub fn render(&self, entry: &Entry, out: &mut String) {
        let mut body = String::with_capacity(entry.lines.iter().map(|l| l.len() + 1).sum());
        for (i, line) in entry.lines.iter().enumerate() {
            if i > 0 {
                body.push('\n');
            } else if let Some(ref tag) = self.tag {
                body.push_str(tag);
                body.push(' ');
            }
            body.push_str(line);
        }

        match self.color {
            Some(color) => {
                let _ = write!(out, "{}", body.color(color.xterm()));
            }
            None => out.push_str(&body),
        }
        out.push('\n');
    }
}
