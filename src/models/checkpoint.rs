//! Checkpoint Model
//!
//! Checkpoints are owned by the engine, which creates one automatically on
//! every run command. The driver only lists them and jumps to them.

use serde::{Deserialize, Serialize};

/// An engine snapshot addressable by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Engine-assigned id; 1 is the start of simulation
    pub id: u32,
    /// Absolute simulation time of the snapshot, in picoseconds
    pub time_ps: u64,
}

impl Checkpoint {
    pub fn new(id: u32, time_ps: u64) -> Self {
        Self { id, time_ps }
    }

    /// Parse one row of a checkpoint listing: `<id> <time> <unit> [...]`
    ///
    /// The time may also be written with the unit attached (`20ns`).
    pub fn parse_row(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let id = tokens.next()?.trim_end_matches(':').parse().ok()?;

        let time_token = tokens.next()?;
        let time_ps = if time_token.chars().all(|c| c.is_ascii_digit()) {
            let unit = tokens.next()?;
            crate::protocol::time::parse_time(&format!("{} {}", time_token, unit)).ok()?
        } else {
            let target = crate::protocol::time::parse_time_target(time_token).ok()?;
            u64::try_from(target).ok()?
        };

        Some(Self { id, time_ps })
    }
}

/// Parse a full checkpoint listing
///
/// The first line is a header emitted by the engine and is always dropped.
/// Rows that do not parse are skipped; their order is preserved otherwise.
pub fn parse_checkpoint_list(lines: &[String]) -> Vec<Checkpoint> {
    lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let parsed = Checkpoint::parse_row(line);
            if parsed.is_none() && !line.trim().is_empty() {
                debug!("Skipping checkpoint row '{}'", line);
            }
            parsed
        })
        .collect()
}
