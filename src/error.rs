//! Error types and Result aliases for the UCLI driver

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure categories
///
/// Startup failures (`Launch`, `Protocol`) abort session construction.
/// `UserInput` errors never change session state and are normally reported
/// back as diagnostic text rather than propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The engine could not be launched or died before becoming ready
    Launch,
    /// The engine answered, but not in a shape the handshake understands
    Protocol,
    /// The engine went away mid-session
    Runtime,
    /// A caller-supplied value could not be interpreted
    UserInput,
    /// Configuration loading or validation
    Config,
    /// Underlying I/O or serialization failures
    Io,
}

/// Main error type for the UCLI driver
#[derive(Debug)]
pub enum Error {
    // === Launch errors ===
    /// Empty command line
    EmptyCommand,

    /// First token of the command line is not an executable
    ExecutableNotFound {
        command: String,
    },

    /// The OS refused to spawn the process
    SpawnFailed {
        command: String,
        reason: String,
    },

    /// The engine exited before the startup handshake completed
    ProcessExited {
        phase: String,
    },

    /// The startup handshake did not complete in time
    StartupTimeout {
        phase: String,
        duration: Duration,
    },

    // === Protocol errors ===
    /// No signal in the root scope looks like a clock
    ClockNotFound {
        candidates: usize,
    },

    /// The clock period measurement returned something that is not a time
    ClockPeriodUnparsable {
        response: String,
    },

    // === Runtime errors ===
    /// The session has already been closed or the engine exited
    SessionClosed,

    /// Failed to write a command to the engine
    WriteFailed {
        command: String,
        reason: String,
    },

    /// A ticketed command produced no prompt within the read timeout
    CommandTimeout {
        command: String,
        duration: Duration,
    },

    // === User input errors ===
    /// A time target could not be parsed
    InvalidTimeTarget {
        input: String,
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    /// Regex compilation errors
    Regex(regex::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyCommand
            | Error::ExecutableNotFound { .. }
            | Error::SpawnFailed { .. }
            | Error::ProcessExited { .. }
            | Error::StartupTimeout { .. } => ErrorKind::Launch,
            Error::ClockNotFound { .. } | Error::ClockPeriodUnparsable { .. } => {
                ErrorKind::Protocol
            }
            Error::SessionClosed | Error::WriteFailed { .. } | Error::CommandTimeout { .. } => {
                ErrorKind::Runtime
            }
            Error::InvalidTimeTarget { .. } => ErrorKind::UserInput,
            Error::ConfigLoadFailed { .. }
            | Error::ConfigNotFound
            | Error::ConfigValidationFailed { .. }
            | Error::ConfigSerializationFailed { .. }
            | Error::ConfigParseFailed { .. }
            | Error::Regex(_) => ErrorKind::Config,
            Error::Io(_) | Error::Serde(_) | Error::Toml(_) | Error::Other(_) => ErrorKind::Io,
        }
    }

    /// Whether this error aborts session construction
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Launch | ErrorKind::Protocol)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Launch errors
            Error::EmptyCommand => {
                write!(f, "Engine command line cannot be empty")
            }
            Error::ExecutableNotFound { command } => {
                write!(f, "Executable '{}' not found or not executable", command)
            }
            Error::SpawnFailed { command, reason } => {
                write!(f, "Failed to spawn '{}': {}", command, reason)
            }
            Error::ProcessExited { phase } => {
                write!(f, "Engine exited during startup ({})", phase)
            }
            Error::StartupTimeout { phase, duration } => {
                write!(f, "Engine startup timed out during {} after {:?}", phase, duration)
            }

            // Protocol errors
            Error::ClockNotFound { candidates } => {
                write!(
                    f,
                    "No clock signal found among {} top-level names",
                    candidates
                )
            }
            Error::ClockPeriodUnparsable { response } => {
                write!(f, "Could not determine clock period from '{}'", response)
            }

            // Runtime errors
            Error::SessionClosed => {
                write!(f, "Session is closed")
            }
            Error::WriteFailed { command, reason } => {
                write!(f, "Failed to send '{}' to engine: {}", command, reason)
            }
            Error::CommandTimeout { command, duration } => {
                write!(f, "No response to '{}' within {:?}", command, duration)
            }

            // User input errors
            Error::InvalidTimeTarget { input, reason } => {
                write!(f, "Invalid time target '{}': {}", input, reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),
            Error::Regex(err) => write!(f, "Regex compilation error: {}", err),

            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Toml(err) => Some(err),
            Error::Regex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Regex(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
