//! Clock Model
//!
//! The clock is discovered from the design rather than configured: its name
//! comes from the root scope listing and its period from watching one edge.

use serde::{Deserialize, Serialize};

/// Discovered clock signal and its period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockModel {
    /// Name of the clock signal
    pub signal: String,
    /// Full period in picoseconds; never zero
    pub period_ps: u64,
}

impl ClockModel {
    /// Build from the time of the first transition after time zero
    pub fn from_half_period(signal: String, half_period_ps: u64) -> Option<Self> {
        let period_ps = half_period_ps.checked_mul(2)?;
        (period_ps > 0).then_some(Self { signal, period_ps })
    }

    /// Clock cycle containing `time_ps`
    pub fn cycle_at(&self, time_ps: u64) -> u64 {
        time_ps / self.period_ps
    }

    /// Signed duration of `cycles` clock cycles
    pub fn cycles_to_ps(&self, cycles: i64) -> Option<i64> {
        i64::try_from(self.period_ps).ok()?.checked_mul(cycles)
    }
}

/// Pick the clock out of a root-scope listing
///
/// An exact `clock`/`clk` name wins; otherwise the first name matching the
/// pattern is used.
pub fn discover_clock<'a>(names: &'a [String], pattern: &regex::Regex) -> Option<&'a str> {
    names
        .iter()
        .find(|name| {
            let lower = name.to_ascii_lowercase();
            lower == "clock" || lower == "clk"
        })
        .or_else(|| names.iter().find(|name| pattern.is_match(name)))
        .map(String::as_str)
}
