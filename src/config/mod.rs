//! Configuration management for the UCLI driver
//!
//! Everything the driver needs to know about the engine that is not
//! discovered at runtime: the prompt sentinel, the flags that put the
//! simulator into interactive mode, the startup command list, and the
//! timeouts that bound blocking operations.

pub mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Prompt printed by the engine when it is ready for the next command
pub const DEFAULT_PROMPT: &str = "ucli% ";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Engine protocol configuration
    pub engine: EngineConfig,

    /// Session timing configuration
    pub session: SessionConfig,
}

/// Engine protocol configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prompt sentinel; the only frame delimiter in the protocol
    pub prompt: String,

    /// Flags appended to the user's command line before spawning
    pub interactive_flags: Vec<String>,

    /// Commands issued right after the first prompt
    pub init_commands: Vec<String>,

    /// Case-insensitive pattern used to pick the clock out of `show`
    pub clock_pattern: String,

    /// Checkpoint that marks the start of simulation
    pub rewind_checkpoint: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            interactive_flags: vec![
                "-ucli".to_string(),
                "-suppress=ASLR_DETECTED_INFO".to_string(),
                "-ucli2Proc".to_string(),
            ],
            init_commands: vec!["config ckptstep off".to_string(), "run -delta".to_string()],
            clock_pattern: "clock|clk".to_string(),
            rewind_checkpoint: 1,
        }
    }
}

impl EngineConfig {
    /// Compile the clock pattern
    pub fn clock_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&format!("(?i){}", self.clock_pattern))?)
    }
}

/// Session timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound for a blocking read, in milliseconds
    pub read_timeout_ms: u64,

    /// Upper bound for the whole startup handshake, in milliseconds
    pub startup_timeout_ms: u64,

    /// Number of completed commands kept in the session history
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 30_000,
            startup_timeout_ms: 120_000,
            history_limit: 256,
        }
    }
}

impl SessionConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

impl DriverConfig {
    /// Check the configuration for values the driver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.engine.prompt.is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "engine.prompt".to_string(),
                reason: "Prompt sentinel cannot be empty".to_string(),
            });
        }

        if self.engine.prompt.contains('\n') {
            return Err(Error::ConfigValidationFailed {
                field: "engine.prompt".to_string(),
                reason: "Prompt sentinel cannot span lines".to_string(),
            });
        }

        if self.engine.clock_pattern.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "engine.clock_pattern".to_string(),
                reason: "Clock pattern cannot be empty".to_string(),
            });
        }

        if let Err(e) = self.engine.clock_regex() {
            return Err(Error::ConfigValidationFailed {
                field: "engine.clock_pattern".to_string(),
                reason: e.to_string(),
            });
        }

        if self.engine.rewind_checkpoint == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "engine.rewind_checkpoint".to_string(),
                reason: "Checkpoint ids start at 1".to_string(),
            });
        }

        if self.session.read_timeout_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "session.read_timeout_ms".to_string(),
                reason: "Read timeout must be greater than 0".to_string(),
            });
        }

        if self.session.startup_timeout_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "session.startup_timeout_ms".to_string(),
                reason: "Startup timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
