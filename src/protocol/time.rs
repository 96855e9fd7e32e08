//! Simulation time parsing
//!
//! The engine reports time as `<int> <unit>`; the driver works in
//! picoseconds throughout.

use std::fmt;
use std::str::FromStr;

/// Why a time string could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("empty time report")]
    Empty,

    #[error("expected '<int> <unit>', got '{0}'")]
    Malformed(String),

    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    #[error("unknown time unit '{0}'")]
    UnknownUnit(String),

    #[error("time value overflows picoseconds")]
    Overflow,
}

/// Time units understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Ps,
    Ns,
    Us,
    Ms,
    S,
}

impl TimeUnit {
    /// Picoseconds per unit
    pub fn multiplier(self) -> u64 {
        match self {
            TimeUnit::Ps => 1,
            TimeUnit::Ns => 1_000,
            TimeUnit::Us => 1_000_000,
            TimeUnit::Ms => 1_000_000_000,
            TimeUnit::S => 1_000_000_000_000,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "s" => Ok(TimeUnit::S),
            _ => Err(TimeParseError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        };
        f.write_str(s)
    }
}

/// Strictly parse a `<int> <unit>` report into picoseconds
pub fn parse_time(line: &str) -> Result<u64, TimeParseError> {
    let mut tokens = line.split_whitespace();
    let value = tokens.next().ok_or(TimeParseError::Empty)?;
    let unit = tokens
        .next()
        .ok_or_else(|| TimeParseError::Malformed(line.trim().to_string()))?;

    let value: u64 = value
        .parse()
        .map_err(|_| TimeParseError::NotAnInteger(value.to_string()))?;
    let unit: TimeUnit = unit.parse()?;

    value
        .checked_mul(unit.multiplier())
        .ok_or(TimeParseError::Overflow)
}

/// Lenient parse of a time query response
///
/// `None` means the engine gave no usable answer, which happens once the
/// simulation has ended. An unrecognised unit yields `Some(0)`.
pub fn parse_time_report(lines: &[String]) -> Option<u64> {
    let line = lines.first()?;
    match parse_time(line) {
        Ok(ps) => Some(ps),
        Err(TimeParseError::UnknownUnit(unit)) => {
            warn!("Unrecognized time unit '{}' in '{}', assuming 0", unit, line);
            Some(0)
        }
        Err(e) => {
            debug!("No simulation time in '{}': {}", line, e);
            None
        }
    }
}

/// Parse a user-supplied time target such as `1500`, `20 ns` or `-3us`
///
/// A bare number is taken as picoseconds.
pub fn parse_time_target(input: &str) -> Result<i64, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let split = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let number = number.trim_end();

    let value: i64 = number
        .parse()
        .map_err(|_| TimeParseError::NotAnInteger(number.to_string()))?;
    let unit = match unit {
        "" => TimeUnit::Ps,
        unit => unit.parse()?,
    };

    let multiplier = i64::try_from(unit.multiplier()).map_err(|_| TimeParseError::Overflow)?;
    value.checked_mul(multiplier).ok_or(TimeParseError::Overflow)
}

/// Render picoseconds in the largest unit that divides them exactly
pub fn format_time(ps: u64) -> String {
    let unit = [TimeUnit::S, TimeUnit::Ms, TimeUnit::Us, TimeUnit::Ns]
        .into_iter()
        .find(|unit| ps != 0 && ps % unit.multiplier() == 0)
        .unwrap_or(TimeUnit::Ps);
    format!("{} {}", ps / unit.multiplier(), unit)
}
