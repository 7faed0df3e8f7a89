//! Shared report protocol for the sensor node and its host readout
//!
//! The node writes one report per activation over USB serial:
//!
//! ```text
//! ---\r\n
//! t:23.4567\r\n
//! p:98123.0000\r\n
//! ===\r\n
//! ```
//!
//! Only valid quantities appear, always in [`Quantity::ALL`] order, each as
//! `<tag>:<value>` with exactly [`VALUE_PRECISION`] fraction digits. The
//! device side of this module formats lines; the host side parses them back
//! into [`ReportBlock`]s.
//!
//! The host only accepts the eight known tags. A line with any other tag is
//! rejected and skipped rather than exported under its raw name, so a
//! corrupted tag never creates a new field in the database.

use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Quantity;

#[cfg(feature = "std")]
use std::string::String;

/// First line of every report
pub const START_DELIMITER: &str = "---\r\n";

/// Last line of every report
pub const END_DELIMITER: &str = "===\r\n";

/// Separator between tag and value
pub const FIELD_SEPARATOR: char = ':';

/// Fraction digits of every reported value
pub const VALUE_PRECISION: usize = 4;

/// Upper bound of one formatted field line, terminator included.
///
/// The longest finite `f32` rendered with four fraction digits plus the
/// longest tag stays well below this.
pub const MAX_LINE_LEN: usize = 64;

/// Default InfluxDB measurement name for exported blocks
pub const DEFAULT_MEASUREMENT: &str = "environment";

// ============================================================================
// Device side
// ============================================================================

/// Write one `<tag>:<value>\r\n` report line.
///
/// Non-finite values are spelled `nan`, `inf` and `-inf`, the way C's
/// `printf("%.4f")` prints them.
pub fn write_line<W: fmt::Write>(out: &mut W, quantity: Quantity, value: f32) -> fmt::Result {
    write!(out, "{}{}", quantity.tag(), FIELD_SEPARATOR)?;
    if value.is_nan() {
        out.write_str("nan")?;
    } else if value.is_infinite() {
        out.write_str(if value > 0.0 { "inf" } else { "-inf" })?;
    } else {
        write!(out, "{:.*}", VALUE_PRECISION, value)?;
    }
    out.write_str("\r\n")
}

// ============================================================================
// Host side
// ============================================================================

/// Why a report line could not be parsed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The line has no `:` separator
    #[error("missing ':' separator")]
    MissingSeparator,
    /// The tag does not name a tracked quantity
    #[error("unknown quantity tag")]
    UnknownTag,
    /// The value is not a number
    #[error("invalid numeric value")]
    InvalidValue,
}

/// One parsed report field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Which quantity
    pub quantity: Quantity,
    /// Reported value
    pub value: f64,
}

/// Parse a single `<tag>:<value>` field line (surrounding whitespace ignored).
///
/// Non-finite values are rejected: line protocol has no encoding for them.
pub fn parse_line(line: &str) -> Result<Reading, ParseError> {
    let (tag, value) = line
        .trim()
        .split_once(FIELD_SEPARATOR)
        .ok_or(ParseError::MissingSeparator)?;

    let quantity = Quantity::from_tag(tag.trim()).ok_or(ParseError::UnknownTag)?;
    let value = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ParseError::InvalidValue)?;

    Ok(Reading { quantity, value })
}

/// The fields of one complete report, in the order they were received
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportBlock {
    readings: Vec<Reading, { Quantity::COUNT }>,
}

impl ReportBlock {
    /// Create an empty block
    pub const fn new() -> Self {
        Self {
            readings: Vec::new(),
        }
    }

    /// Add a reading; a repeated quantity overwrites the earlier value
    pub fn insert(&mut self, reading: Reading) {
        if let Some(existing) = self
            .readings
            .iter_mut()
            .find(|r| r.quantity == reading.quantity)
        {
            existing.value = reading.value;
        } else {
            // One entry per quantity, so capacity is never exceeded.
            let _ = self.readings.push(reading);
        }
    }

    /// Value reported for `quantity`, if present
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.quantity == quantity)
            .map(|r| r.value)
    }

    /// Readings in received order
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the report carried no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Render as one InfluxDB line-protocol record.
    ///
    /// `<measurement>,location=<location> <field>=<value>,... <timestamp_ns>\n`
    ///
    /// Returns `None` for an empty block, which has no valid encoding.
    #[cfg(feature = "std")]
    pub fn to_line_protocol(
        &self,
        measurement: &str,
        location: &str,
        timestamp_ns: u128,
    ) -> Option<String> {
        use std::fmt::Write;

        if self.is_empty() {
            return None;
        }

        let mut line = String::new();
        let _ = write!(
            line,
            "{},location={} ",
            escape_key(measurement),
            escape_key(location)
        );
        for (i, reading) in self.readings.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let _ = write!(line, "{}={}", reading.quantity.field_name(), reading.value);
        }
        let _ = writeln!(line, " {}", timestamp_ns);
        Some(line)
    }
}

/// Escape commas, spaces and equals signs in measurement and tag text
#[cfg(feature = "std")]
fn escape_key(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, ',' | ' ' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// What the parser did with one input line
#[derive(Clone, Debug, PartialEq)]
pub enum Feed {
    /// Line outside a report, or blank
    Ignored,
    /// Start delimiter; any partial report was discarded
    Started,
    /// Field latched into the current report
    Field(Reading),
    /// Field line inside a report that could not be parsed (skipped)
    Rejected(ParseError),
    /// End delimiter; the finished report
    Completed(ReportBlock),
}

/// Line-by-line reassembly of reports from the serial stream.
///
/// Lines before the first start delimiter are ignored, so a reader that
/// attaches mid-report does not emit a truncated block.
#[derive(Clone, Debug, Default)]
pub struct ReportParser {
    current: Option<ReportBlock>,
}

impl ReportParser {
    /// Create a parser waiting for a start delimiter
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Whether a report is currently being latched
    pub fn in_report(&self) -> bool {
        self.current.is_some()
    }

    /// Process one line (terminator optional)
    pub fn feed(&mut self, line: &str) -> Feed {
        let line = line.trim();

        if line == START_DELIMITER.trim_end() {
            self.current = Some(ReportBlock::new());
            return Feed::Started;
        }

        if line == END_DELIMITER.trim_end() {
            return match self.current.take() {
                Some(block) => Feed::Completed(block),
                None => Feed::Ignored,
            };
        }

        let Some(block) = self.current.as_mut() else {
            return Feed::Ignored;
        };

        if line.is_empty() {
            return Feed::Ignored;
        }

        match parse_line(line) {
            Ok(reading) => {
                block.insert(reading);
                Feed::Field(reading)
            }
            Err(e) => Feed::Rejected(e),
        }
    }
}
