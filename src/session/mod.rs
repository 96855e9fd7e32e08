//! Simulator sessions
//!
//! A [`Session`] is one engine process behind a typed API. It is built by
//! [`Session::launch`] (spawn from a command line) or [`Session::start`]
//! (any transport), both of which run the startup handshake before
//! returning. Startup failures are errors; once running, engine
//! termination shows up as empty results and `None` times instead.

pub mod controller;
mod demux;
mod handshake;
pub mod output_store;
pub mod queue;
mod shared;

pub use controller::{ReadMode, SessionController};
pub use output_store::{OutputStore, UNDEFINED_KEY};
pub use queue::{CommandQueue, PendingCommand};

use tokio::sync::watch;

use crate::catalog::VariableCatalog;
use crate::config::DriverConfig;
use crate::error::Result;
use crate::models::{ClockModel, CommandRecord, SessionState, Value, Variable};
use crate::protocol::commands;
use crate::time::{TimeController, TimeTravel};
use crate::transport::Transport;

/// A ready simulator session
///
/// Dropping the session closes it, even if [`SessionController`] clones
/// are still around.
#[derive(Debug)]
pub struct Session {
    controller: SessionController,
    time: TimeController,
    catalog: VariableCatalog,
}

impl Session {
    /// Spawn the engine from `command_line` and run the handshake
    pub async fn launch(command_line: &str, config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::spawn(command_line, &config.engine.interactive_flags)?;
        Self::start(transport, config).await
    }

    /// Run the handshake over an existing transport
    pub async fn start(transport: Transport, config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let controller = SessionController::attach(transport, &config);

        match handshake::perform(&controller, &config).await {
            Ok(clock) => {
                controller.mark_ready();
                info!("Session ready");
                Ok(Self {
                    time: TimeController::new(
                        controller.clone(),
                        clock,
                        config.engine.rewind_checkpoint,
                    ),
                    catalog: VariableCatalog::new(controller.clone()),
                    controller,
                })
            }
            Err(e) => {
                error!("Session startup failed: {}", e);
                controller.mark_errored();
                controller.close();
                Err(e)
            }
        }
    }

    /// Handle for sharing the session with other tasks
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn clock(&self) -> &ClockModel {
        self.time.clock()
    }

    pub fn time(&self) -> &TimeController {
        &self.time
    }

    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    // === Raw command access ===

    /// See [`SessionController::run`]
    pub fn run(&self, command: &str) {
        self.controller.run(command)
    }

    /// See [`SessionController::read`]
    pub async fn read(&self, command: &str, mode: ReadMode) -> Vec<String> {
        self.controller.read(command, mode).await
    }

    /// See [`SessionController::execute`]
    pub async fn execute(&self, command: &str) -> Result<Vec<String>> {
        self.controller.execute(command).await
    }

    pub async fn wait_idle(&self) -> Result<()> {
        self.controller.wait_idle().await
    }

    // === Design access ===

    pub async fn list_vars(&self) -> Vec<Variable> {
        self.catalog.list_vars().await
    }

    /// Decoded value of a signal; `None` if the engine printed nothing
    pub async fn get_value(&self, name: &str) -> Option<Value> {
        let lines = self.controller.try_execute(&commands::get(name)).await;
        lines.first().map(|line| Value::decode(line))
    }

    /// Display form of a signal's value: hex for known bits, the literal
    /// bits when any are x/z
    pub async fn get_var(&self, name: &str) -> String {
        self.get_value(name)
            .await
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    pub async fn drivers(&self, signal: &str) -> Vec<String> {
        self.controller.try_execute(&commands::drivers(signal)).await
    }

    pub async fn loads(&self, signal: &str) -> Vec<String> {
        self.controller.try_execute(&commands::loads(signal)).await
    }

    // === Time ===

    pub async fn get_time(&self) -> Option<u64> {
        self.time.get_time().await
    }

    pub async fn get_clock(&self) -> Option<u64> {
        self.time.get_clock().await
    }

    pub async fn set_time(&self, target_ps: i64, relative: bool) -> TimeTravel {
        self.time.set_time(target_ps, relative).await
    }

    pub async fn set_time_str(&self, input: &str, relative: bool) -> TimeTravel {
        self.time.set_time_str(input, relative).await
    }

    pub async fn clock_cycle(&self, cycles: i64) -> TimeTravel {
        self.time.clock_cycle(cycles).await
    }

    // === Source stepping ===

    /// Execute one source statement
    pub async fn step_next(&self) -> Vec<String> {
        self.controller.try_execute(&commands::step()).await
    }

    /// Source lines around the active statement
    pub async fn get_code(&self, lines: u32) -> Vec<String> {
        self.controller
            .try_execute(&commands::listing_active(lines))
            .await
    }

    // === Lifecycle ===

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.controller.subscribe_state()
    }

    pub fn history(&self) -> Vec<CommandRecord> {
        self.controller.history()
    }

    pub fn interrupt(&self) -> Result<()> {
        self.controller.interrupt()
    }

    /// Stop the session; idempotent
    pub fn close(&self) {
        self.controller.close()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.controller.close();
    }
}
