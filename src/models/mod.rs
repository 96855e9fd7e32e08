//! Core data models for the UCLI driver
//!
//! Plain data that flows between the session, time and catalog layers:
//! the discovered clock, engine checkpoints, catalog entries, decoded
//! values, the session lifecycle and the command history.

pub mod checkpoint;
pub mod clock;
pub mod command_record;
pub mod session_state;
pub mod value;
pub mod variable;

// Re-exports for convenience
pub use checkpoint::Checkpoint;
pub use clock::ClockModel;
pub use command_record::{CommandHistory, CommandRecord};
pub use session_state::SessionState;
pub use value::Value;
pub use variable::Variable;
