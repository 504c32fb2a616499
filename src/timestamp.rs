//! Timestamp extraction from the start of log lines.
//!
//! Supports `YYYY-MM-DD HH:MM:SS,mmm` (comma milliseconds),
//! `YYYY-MM-DD HH:MM:SS[.f]` with 1-9 fractional digits (also with `/` as the
//! date separator), numeric Unix epoch seconds (integer or decimal, possibly
//! negative), and an optional user-supplied regex + strftime matcher.
//!
//! All notations are read as UTC. Fractional seconds are rounded half-up to
//! nanoseconds, so equal instants compare equal whichever notation wrote them.

use std::fmt;
use std::sync::LazyLock;

use jiff::civil::DateTime;
use jiff::fmt::strtime::BrokenDownTime;
use jiff::tz::TimeZone;
use regex::Regex;

use crate::error::MergeError;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

// Custom formats without a year parse into this one, as strptime(3) does.
const DEFAULT_YEAR: i16 = 1900;

static COMMA_MILLIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2}) ([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})")
        .expect("comma-millis pattern is valid")
});

// The two date separators are checked for equality after matching.
static CALENDAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})[-/]([0-9]{2})[-/]([0-9]{2}) ([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,9}))?",
    )
    .expect("calendar pattern is valid")
});

static EPOCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?)([0-9]+)(?:\.([0-9]+))?").expect("epoch pattern is valid")
});

/// An absolute UTC point in time with nanosecond precision.
///
/// Totally ordered. [`Instant::BEGINNING`] sorts before every parsed value and
/// marks lines that precede the first timestamp of a source. It is reserved:
/// no constructor or matcher ever produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant(jiff::Timestamp);

impl Instant {
    /// Sentinel "beginning of time".
    pub const BEGINNING: Self = Self(jiff::Timestamp::MIN);

    /// Build an instant from nanoseconds since the Unix epoch.
    pub fn from_nanosecond(nanos: i128) -> Option<Self> {
        jiff::Timestamp::from_nanosecond(nanos).ok().and_then(Self::parsed)
    }

    /// Build an instant from milliseconds since the Unix epoch.
    pub fn from_millisecond(millis: i64) -> Option<Self> {
        jiff::Timestamp::from_millisecond(millis).ok().and_then(Self::parsed)
    }

    fn parsed(ts: jiff::Timestamp) -> Option<Self> {
        (ts != jiff::Timestamp::MIN).then_some(Self(ts))
    }

    /// Format for diagnostics as `YYYY-MM-DDTHH:MM:SS.mmm` in UTC.
    pub fn format_display(&self) -> String {
        if *self == Self::BEGINNING {
            return "-".to_string();
        }
        let zdt = self.0.to_zoned(TimeZone::UTC);
        zdt.strftime("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_display())
    }
}

/// A successful extraction: the instant and the byte offset where the
/// timestamp token ends within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted {
    pub instant: Instant,
    pub end: usize,
}

/// User-supplied matcher: a regex whose first capture group holds the
/// timestamp, and the strftime format that parses it.
#[derive(Debug, Clone)]
pub struct CustomMatcher {
    regex: Regex,
    format: String,
}

impl CustomMatcher {
    /// Compile a custom matcher. The regex is anchored at the start of the
    /// line and must contain at least one capture group.
    ///
    /// Formats without a year (`%b %d %H:%M:%S`) land in 1900, and without a
    /// month or day on January 1st.
    pub fn new(pattern: &str, format: &str) -> Result<Self, MergeError> {
        let regex = Regex::new(&format!("^(?:{pattern})"))?;
        if regex.captures_len() < 2 {
            return Err(MergeError::Config(format!(
                "timestamp regex '{pattern}' needs a capture group around the timestamp"
            )));
        }
        Ok(Self {
            regex,
            format: format.to_string(),
        })
    }

    fn parse(&self, text: &str) -> Option<(Instant, usize)> {
        let caps = self.regex.captures(text)?;
        let group = caps.get(1)?;
        let raw = group.as_str();

        let mut tm = BrokenDownTime::parse(&self.format, raw).ok()?;
        // Formats with an offset (%z, %Q, ...) or %s resolve to an exact instant
        if let Ok(ts) = tm.to_timestamp() {
            return Some((Instant::parsed(ts)?, group.end()));
        }
        if tm.year().is_none() {
            tm.set_year(Some(DEFAULT_YEAR)).ok()?;
        }
        if tm.month().is_none() {
            tm.set_month(Some(1)).ok()?;
        }
        if tm.day().is_none() {
            tm.set_day(Some(1)).ok()?;
        }
        let zoned = tm.to_datetime().ok()?.to_zoned(TimeZone::UTC).ok()?;
        Some((Instant::parsed(zoned.timestamp())?, group.end()))
    }
}

/// One timestamp notation.
///
/// Matchers are tried in the order held by an [`Extractor`]; the first that
/// parses wins.
#[derive(Debug, Clone)]
pub enum FormatMatcher {
    /// User-defined regex + strftime format.
    Custom(CustomMatcher),
    /// `YYYY-MM-DD HH:MM:SS,mmm`, exactly three millisecond digits.
    CommaMillis,
    /// `YYYY-MM-DD HH:MM:SS[.f{1,9}]`, `-` or `/` between date parts.
    Calendar,
    /// Seconds since 1970-01-01T00:00:00Z, optionally negative or fractional.
    Epoch,
}

impl FormatMatcher {
    /// Built-in matchers from most to least constrained.
    pub fn builtin() -> Vec<Self> {
        vec![Self::CommaMillis, Self::Calendar, Self::Epoch]
    }

    /// Try to parse a timestamp at the very start of `text`.
    ///
    /// Returns the instant and the number of bytes the token occupies.
    /// Built-in notations must be followed by whitespace or end of line.
    pub fn parse(&self, text: &str) -> Option<(Instant, usize)> {
        let (instant, end) = match self {
            Self::Custom(custom) => return custom.parse(text),
            Self::CommaMillis => parse_comma_millis(text)?,
            Self::Calendar => parse_calendar(text)?,
            Self::Epoch => parse_epoch(text)?,
        };
        at_token_boundary(&text[end..]).then_some((instant, end))
    }
}

/// Locates and parses the timestamp at the start of a line.
///
/// `margin` is the number of leading spaces or tabs tolerated before the
/// timestamp; `0` requires it at column 0.
#[derive(Debug, Clone)]
pub struct Extractor {
    matchers: Vec<FormatMatcher>,
    margin: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            matchers: FormatMatcher::builtin(),
            margin: 0,
        }
    }
}

impl Extractor {
    /// Built-in matchers, preceded by `custom` when given.
    pub fn new(custom: Option<CustomMatcher>, margin: usize) -> Self {
        let mut matchers = Vec::with_capacity(4);
        if let Some(custom) = custom {
            matchers.push(FormatMatcher::Custom(custom));
        }
        matchers.extend(FormatMatcher::builtin());
        Self { matchers, margin }
    }

    /// Set the leading-whitespace margin.
    #[must_use]
    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    pub fn matchers(&self) -> &[FormatMatcher] {
        &self.matchers
    }

    pub const fn margin(&self) -> usize {
        self.margin
    }

    /// Extract the timestamp at the start of `line`, or `None` when no
    /// matcher recognises one.
    pub fn extract(&self, line: &str) -> Option<Extracted> {
        let skip = line
            .bytes()
            .take(self.margin)
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        let text = &line[skip..];

        self.matchers.iter().find_map(|matcher| {
            matcher.parse(text).map(|(instant, end)| Extracted {
                instant,
                end: skip + end,
            })
        })
    }
}

fn at_token_boundary(rest: &str) -> bool {
    rest.chars().next().is_none_or(char::is_whitespace)
}

fn parse_comma_millis(text: &str) -> Option<(Instant, usize)> {
    let caps = COMMA_MILLIS_RE.captures(text)?;
    let nanos = fraction_nanos(&caps[7]);
    let instant = civil_instant(&caps, nanos)?;
    Some((instant, caps.get(0)?.end()))
}

fn parse_calendar(text: &str) -> Option<(Instant, usize)> {
    let caps = CALENDAR_RE.captures(text)?;
    let bytes = text.as_bytes();
    if bytes[4] != bytes[7] {
        return None;
    }
    let nanos = caps.get(7).map_or(0, |m| fraction_nanos(m.as_str()));
    let instant = civil_instant(&caps, nanos)?;
    Some((instant, caps.get(0)?.end()))
}

fn parse_epoch(text: &str) -> Option<(Instant, usize)> {
    let caps = EPOCH_RE.captures(text)?;
    let seconds: i128 = caps[2].parse().ok()?;
    let fraction = caps.get(3).map_or(0, |m| fraction_nanos(m.as_str()));
    let magnitude = seconds.checked_mul(NANOS_PER_SECOND)?.checked_add(fraction)?;
    let nanos = if caps[1].is_empty() {
        magnitude
    } else {
        -magnitude
    };
    let instant = Instant::from_nanosecond(nanos)?;
    Some((instant, caps.get(0)?.end()))
}

/// Build a UTC instant from captures 1-6 (year through second) plus
/// sub-second nanoseconds.
fn civil_instant(caps: &regex::Captures<'_>, nanos: i128) -> Option<Instant> {
    let dt = DateTime::new(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        caps[6].parse().ok()?,
        0,
    )
    .ok()?;
    let whole = dt.to_zoned(TimeZone::UTC).ok()?.timestamp();
    Instant::from_nanosecond(whole.as_nanosecond() + nanos)
}

/// Convert fractional-second digits to nanoseconds, rounding half-up past
/// the ninth digit. May return exactly one second when rounding carries.
fn fraction_nanos(digits: &str) -> i128 {
    let mut nanos: i128 = 0;
    let mut scale = NANOS_PER_SECOND;
    for b in digits.bytes().take(9) {
        scale /= 10;
        nanos += i128::from(b - b'0') * scale;
    }
    if digits.len() > 9 && digits.as_bytes()[9] >= b'5' {
        nanos += 1;
    }
    nanos
}
