//! Wire protocol of the engine's interactive console
//!
//! Requests are raw command lines; responses are whatever lines the engine
//! prints before the prompt comes back. This module holds the pieces that
//! understand that text: the prompt framer, the command vocabulary and the
//! time/checkpoint report parsers.

pub mod commands;
pub mod framer;
pub mod time;

pub use framer::LineFramer;
pub use time::{format_time, parse_time, parse_time_report, parse_time_target, TimeParseError, TimeUnit};
