//! Engine command vocabulary
//!
//! Commands are opaque text on the wire; these builders only exist so the
//! exact spelling lives in one place.

/// Enumerate names in the root scope
pub fn show() -> String {
    "show".to_string()
}

/// Enumerate names with their type tags, at the root or inside `scope`
pub fn show_typed(scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("show -type {}.*", scope),
        None => "show -type".to_string(),
    }
}

/// Read the value of a signal
pub fn get(name: &str) -> String {
    format!("get {}", name)
}

/// Advance simulation time by `ps` picoseconds
pub fn run_relative(ps: u64) -> String {
    format!("run -relative {}ps", ps)
}

/// Advance until the next value change of `signal`
pub fn run_change(signal: &str) -> String {
    format!("run -change {}", signal)
}

/// Advance by a single delta cycle
pub fn run_delta() -> String {
    "run -delta".to_string()
}

/// List the engine's checkpoints
pub fn checkpoint_list() -> String {
    "checkpoint -list".to_string()
}

/// Restore the simulation to a checkpoint
pub fn checkpoint_join(id: u32) -> String {
    format!("checkpoint -join {}", id)
}

/// Report the current simulation time
pub fn time_query() -> String {
    "senv time".to_string()
}

/// Execute one source statement
pub fn step() -> String {
    "step".to_string()
}

/// Show `lines` lines of source around the active statement
pub fn listing_active(lines: u32) -> String {
    format!("listing -active {}", lines)
}

/// List the drivers of a signal
pub fn drivers(signal: &str) -> String {
    format!("drivers {}", signal)
}

/// List the loads of a signal
pub fn loads(signal: &str) -> String {
    format!("loads {}", signal)
}

/// Leave the interactive shell
pub fn exit() -> String {
    "exit".to_string()
}
