//! Startup handshake
//!
//! Initialises the engine, discovers the clock signal and measures its
//! period, then rolls that run back so the session starts at time zero.

use std::time::Duration;
use tokio::time::Instant;

use super::controller::SessionController;
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::models::clock::{discover_clock, ClockModel};
use crate::models::variable::parse_scope_entry;
use crate::protocol::{commands, parse_time};

/// Drives the handshake against one deadline
struct Handshake<'a> {
    session: &'a SessionController,
    deadline: Instant,
    budget: Duration,
}

impl Handshake<'_> {
    async fn step(&self, phase: &str, command: &str) -> Result<Vec<String>> {
        match tokio::time::timeout_at(self.deadline, self.session.request(command, None)).await {
            Ok(Ok(lines)) => Ok(lines),
            Ok(Err(Error::SessionClosed)) => Err(Error::ProcessExited {
                phase: phase.to_string(),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::StartupTimeout {
                phase: phase.to_string(),
                duration: self.budget,
            }),
        }
    }

    async fn drain(&self) -> Result<()> {
        match tokio::time::timeout_at(self.deadline, self.session.wait_idle()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(Error::ProcessExited {
                phase: "drain".to_string(),
            }),
            Err(_) => Err(Error::StartupTimeout {
                phase: "drain".to_string(),
                duration: self.budget,
            }),
        }
    }
}

/// Run the handshake and return the discovered clock
pub(crate) async fn perform(session: &SessionController, config: &DriverConfig) -> Result<ClockModel> {
    let budget = config.session.startup_timeout();
    let handshake = Handshake {
        session,
        deadline: Instant::now() + budget,
        budget,
    };

    for command in &config.engine.init_commands {
        handshake.step("initialization", command).await?;
    }

    let listing = handshake.step("clock discovery", &commands::show()).await?;
    let names: Vec<String> = listing
        .iter()
        .filter_map(|line| parse_scope_entry(line))
        .map(|entry| entry.name)
        .collect();
    let pattern = config.engine.clock_regex()?;
    let signal = discover_clock(&names, &pattern)
        .ok_or(Error::ClockNotFound {
            candidates: names.len(),
        })?
        .to_string();
    info!("Discovered clock signal '{}'", signal);

    handshake
        .step("period discovery", &commands::run_change(&signal))
        .await?;
    let report = handshake
        .step("period discovery", &commands::time_query())
        .await?;
    let unparsable = || Error::ClockPeriodUnparsable {
        response: report.join("\n"),
    };
    let half_period = report
        .first()
        .and_then(|line| parse_time(line).ok())
        .ok_or_else(unparsable)?;
    let clock = ClockModel::from_half_period(signal, half_period).ok_or_else(unparsable)?;
    info!("Clock '{}' has a period of {} ps", clock.signal, clock.period_ps);

    handshake
        .step(
            "rewind",
            &commands::checkpoint_join(config.engine.rewind_checkpoint),
        )
        .await?;

    handshake.drain().await?;
    session.clear_output();
    Ok(clock)
}
