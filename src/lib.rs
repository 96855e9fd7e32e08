//! ucli-driver - typed request/response access to a simulator debug console
//!
//! Hardware simulators expose an interactive console (UCLI) that speaks a
//! human REPL protocol: one command at a time, free-form output lines, and a
//! recurring `ucli% ` prompt as the only framing. This crate turns that
//! console into an async API.
//!
//! ## Module Organization
//!
//! - [`session`] - Session lifecycle, command queue, output demultiplexing
//! - [`time`] - Clock-cycle/time conversion and checkpoint-based rewind
//! - [`catalog`] - Recursive enumeration of design signals
//! - [`transport`] - Engine process spawning and stream ownership
//! - [`protocol`] - Prompt framing, command vocabulary, time parsing
//! - [`models`] - Clock, checkpoints, variables, decoded values
//! - [`config`] - Configuration loading and validation
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use ucli_driver::{DriverConfig, Session};
//!
//! # async fn demo() -> ucli_driver::Result<()> {
//! let session = Session::launch("./build/top.simv", DriverConfig::default()).await?;
//!
//! let outcome = session.clock_cycle(10).await;
//! println!("cycle {:?}: {}", session.get_clock().await, outcome.diagnostic);
//! println!("reset = {}", session.get_var("reset").await);
//!
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Each session runs exactly one background task that owns the engine's
//! streams. It reads output, splits it at the prompt and hands each batch to
//! the command that produced it. Callers submit commands over a channel and
//! wait on per-request replies or on the shared output store; nothing
//! polls.
//!
//! Startup problems (missing executable, no clock signal) are returned as
//! errors. After startup, an engine that exits makes commands no-ops, reads
//! return empty output and time queries return `None`.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod protocol;
pub mod session;
pub mod time;
pub mod transport;

// Re-exports for core functionality
pub use catalog::VariableCatalog;
pub use config::loader::ConfigLoader;
pub use config::{DriverConfig, EngineConfig, SessionConfig};
pub use error::{Error, ErrorKind, Result};
pub use models::{Checkpoint, ClockModel, CommandRecord, SessionState, Value, Variable};
pub use session::{ReadMode, Session, SessionController, UNDEFINED_KEY};
pub use time::{TimeController, TimeTravel};
pub use transport::Transport;

// Version information
/// The current version of the driver from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The package description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Load the driver configuration
///
/// With an explicit path the file must exist and be valid. Without one the
/// default search locations are tried, falling back to built-in defaults
/// when nothing is found or the found file is broken.
pub fn load_config(path: Option<&std::path::Path>) -> Result<DriverConfig> {
    if let Some(path) = path {
        info!("Loading configuration from {}", path.display());
        return ConfigLoader::load_from_file(path);
    }

    match ConfigLoader::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Ok(DriverConfig::default())
        }
    }
}

/// Human-readable explanation of a startup failure with hints
pub fn handle_startup_error(error: &Error) -> String {
    match error {
        Error::ExecutableNotFound { command } => {
            format!(
                "Launch Error: '{}' is not an executable\n\nTry:\n• Build the simulation first\n• Check the path and file permissions",
                command
            )
        }
        Error::ProcessExited { phase } => {
            format!(
                "Launch Error: the simulator exited during {}\n\nTry:\n• Run it by hand with -ucli to see its messages\n• Check that it was compiled with debug access",
                phase
            )
        }
        Error::StartupTimeout { phase, duration } => {
            format!(
                "Launch Error: no prompt during {} after {:?}\n\nTry:\n• Raise session.startup_timeout_ms\n• Check engine.prompt matches the simulator's prompt",
                phase, duration
            )
        }
        Error::ClockNotFound { candidates } => {
            format!(
                "Protocol Error: none of {} top-level names looks like a clock\n\nTry:\n• Set engine.clock_pattern to match your clock signal",
                candidates
            )
        }
        Error::ClockPeriodUnparsable { response } => {
            format!(
                "Protocol Error: could not read the clock period from '{}'\n\nTry:\n• Check that the clock toggles after time zero",
                response
            )
        }
        Error::ConfigLoadFailed { path, reason } => {
            format!(
                "Configuration Error: Failed to load config from '{}': {}\n\nTry:\n• Check configuration file syntax\n• Use default configuration",
                path.display(),
                reason
            )
        }
        Error::ConfigValidationFailed { field, reason } => {
            format!(
                "Configuration Error: Validation failed for '{}': {}\n\nTry:\n• Check configuration value\n• Use default configuration",
                field, reason
            )
        }
        _ => {
            format!(
                "Unexpected Error: {}\n\nPlease report this issue with debug logs enabled",
                error
            )
        }
    }
}
