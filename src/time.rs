//! Time control
//!
//! Converts between clock cycles and absolute simulation time and moves the
//! simulation to a target time. The engine can only run forward; going back
//! is emulated by joining the latest checkpoint before the target and
//! running forward from there.

use crate::error::Error;
use crate::models::checkpoint::{parse_checkpoint_list, Checkpoint};
use crate::models::ClockModel;
use crate::protocol::{commands, format_time, parse_time_report, parse_time_target};
use crate::session::SessionController;

/// Outcome of a time-travel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTravel {
    pub success: bool,
    /// Engine output or the reason for failure
    pub diagnostic: String,
}

impl TimeTravel {
    fn ok(diagnostic: impl Into<String>) -> Self {
        Self {
            success: true,
            diagnostic: diagnostic.into(),
        }
    }

    fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: diagnostic.into(),
        }
    }
}

/// Pick the checkpoint to rewind to for `target_ps`
///
/// Scans in listing order for the greatest time strictly before the target;
/// among equal times the first listed wins. `None` means nothing qualifies.
pub fn select_rewind_checkpoint(checkpoints: &[Checkpoint], target_ps: u64) -> Option<Checkpoint> {
    let mut best: Option<Checkpoint> = None;
    for checkpoint in checkpoints {
        if checkpoint.time_ps < target_ps && best.map_or(true, |b| checkpoint.time_ps > b.time_ps) {
            best = Some(*checkpoint);
        }
    }
    best
}

/// Cycle/time conversion and time travel for one session
#[derive(Debug, Clone)]
pub struct TimeController {
    session: SessionController,
    clock: ClockModel,
    rewind_checkpoint: u32,
}

impl TimeController {
    pub fn new(session: SessionController, clock: ClockModel, rewind_checkpoint: u32) -> Self {
        Self {
            session,
            clock,
            rewind_checkpoint,
        }
    }

    pub fn clock(&self) -> &ClockModel {
        &self.clock
    }

    /// Absolute simulation time in picoseconds; `None` once the simulation
    /// has ended or the engine is gone
    pub async fn get_time(&self) -> Option<u64> {
        let report = self.session.try_execute(&commands::time_query()).await;
        parse_time_report(&report)
    }

    /// Current clock cycle
    pub async fn get_clock(&self) -> Option<u64> {
        self.get_time().await.map(|t| self.clock.cycle_at(t))
    }

    /// Move the simulation to `target` picoseconds, absolute or relative
    pub async fn set_time(&self, target: i64, relative: bool) -> TimeTravel {
        let Some(now) = self.get_time().await else {
            return TimeTravel::failed("Simulation time unavailable; the simulation has ended");
        };
        let Ok(now) = i64::try_from(now) else {
            return TimeTravel::failed(format!("Current time {} ps is out of range", now));
        };

        let absolute = if relative {
            match now.checked_add(target) {
                Some(t) => t,
                None => return TimeTravel::failed("Time target overflows"),
            }
        } else {
            target
        };

        if absolute < 0 {
            return TimeTravel::failed(format!(
                "Cannot move to negative time {} ps",
                absolute
            ));
        }

        // both fit in u64 from here on
        let (now_ps, target_ps) = (now.unsigned_abs(), absolute.unsigned_abs());

        if target_ps == now_ps {
            return TimeTravel::ok(format!("Already at {}", format_time(now_ps)));
        }
        if target_ps > now_ps {
            return self.run_forward(target_ps - now_ps).await;
        }
        self.rewind(target_ps).await
    }

    /// Parse a user-entered time (`1500`, `20 ns`, `-3us`) and move there
    pub async fn set_time_str(&self, input: &str, relative: bool) -> TimeTravel {
        match parse_time_target(input) {
            Ok(target) => self.set_time(target, relative).await,
            Err(e) => {
                let error = Error::InvalidTimeTarget {
                    input: input.to_string(),
                    reason: e.to_string(),
                };
                TimeTravel::failed(error.to_string())
            }
        }
    }

    /// Advance (or with negative `cycles`, rewind) by whole clock cycles
    pub async fn clock_cycle(&self, cycles: i64) -> TimeTravel {
        match self.clock.cycles_to_ps(cycles) {
            Some(delta) => self.set_time(delta, true).await,
            None => TimeTravel::failed(format!("{} cycles overflows simulation time", cycles)),
        }
    }

    async fn run_forward(&self, delta_ps: u64) -> TimeTravel {
        match self.session.execute_while_alive(&commands::run_relative(delta_ps)).await {
            Ok(lines) => TimeTravel::ok(lines.join("\n")),
            Err(e) => TimeTravel::failed(e.to_string()),
        }
    }

    async fn rewind(&self, target_ps: u64) -> TimeTravel {
        let listing = match self.session.execute_while_alive(&commands::checkpoint_list()).await {
            Ok(lines) => lines,
            Err(e) => return TimeTravel::failed(e.to_string()),
        };
        let checkpoints = parse_checkpoint_list(&listing);

        let start = select_rewind_checkpoint(&checkpoints, target_ps)
            .unwrap_or_else(|| Checkpoint::new(self.rewind_checkpoint, 0));
        debug!(
            "Rewinding to {} via checkpoint {} at {}",
            format_time(target_ps),
            start.id,
            format_time(start.time_ps)
        );

        let mut output = match self.session.execute_while_alive(&commands::checkpoint_join(start.id)).await {
            Ok(lines) => lines,
            Err(e) => return TimeTravel::failed(e.to_string()),
        };

        let remaining = target_ps.saturating_sub(start.time_ps);
        if remaining > 0 {
            match self.session.execute_while_alive(&commands::run_relative(remaining)).await {
                Ok(lines) => output.extend(lines),
                Err(e) => return TimeTravel::failed(e.to_string()),
            }
        }

        TimeTravel::ok(output.join("\n"))
    }
}
