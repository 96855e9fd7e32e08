//! Session State Model
//!
//! Lifecycle of a driver session, published through a watch channel so
//! callers can observe transitions without polling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// Process spawned, handshake in progress
    #[default]
    Starting,
    /// Idle at the prompt
    Ready,
    /// A command is in flight
    Running,
    /// Closed by the caller or the engine exited cleanly
    Stopped,
    /// Startup failed or the output stream broke
    Errored,
}

impl SessionState {
    /// Whether no further transitions can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Stopped | SessionState::Errored)
    }

    /// Whether the session accepts commands
    pub fn is_live(self) -> bool {
        !self.is_terminal()
    }

    /// Apply a transition, refusing to leave a terminal state
    ///
    /// `Starting` is only left for `Ready` (handshake done) or a terminal
    /// state; busy/idle flips during the handshake are ignored.
    pub fn transition(self, next: SessionState) -> Option<SessionState> {
        if self.is_terminal() || self == next {
            return None;
        }
        match (self, next) {
            (SessionState::Starting, SessionState::Running) => None,
            _ => Some(next),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Starting => "starting",
            SessionState::Ready => "ready",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
            SessionState::Errored => "errored",
        };
        f.write_str(s)
    }
}
