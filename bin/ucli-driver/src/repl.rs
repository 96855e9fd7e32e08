//! Interactive console commands
//!
//! Lines starting with `:` are driver commands; anything else goes to the
//! engine verbatim.

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Print the current simulation time
    Time,
    /// Print the clock cycle, or advance/rewind by `n` cycles
    Clock(Option<i64>),
    /// Move to a time; relative when prefixed with `+` or `-`
    Goto { target: String, relative: bool },
    /// List all signals
    Vars,
    /// Print a signal's value
    Get(String),
    /// Execute one source statement
    Step,
    /// Show source around the active statement
    Code(u32),
    /// Show recent commands
    History,
    Help,
    Quit,
    /// Send the line to the engine as-is
    Raw(String),
    /// Nothing to do
    Empty,
}

/// Parse one console line
pub fn parse_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }
    let Some(meta) = line.strip_prefix(':') else {
        return Ok(ReplCommand::Raw(line.to_string()));
    };

    let mut parts = meta.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match (name, arg) {
        ("time" | "t", None) => Ok(ReplCommand::Time),
        ("clock" | "c", None) => Ok(ReplCommand::Clock(None)),
        ("clock" | "c", Some(n)) => n
            .parse()
            .map(|n| ReplCommand::Clock(Some(n)))
            .map_err(|_| format!("':clock' expects a whole number of cycles, got '{}'", n)),
        ("goto" | "g", Some(target)) => {
            let relative = target.starts_with(['+', '-']);
            Ok(ReplCommand::Goto {
                target: target.to_string(),
                relative,
            })
        }
        ("vars" | "v", None) => Ok(ReplCommand::Vars),
        ("get", Some(signal)) => Ok(ReplCommand::Get(signal.to_string())),
        ("step" | "s", None) => Ok(ReplCommand::Step),
        ("code", None) => Ok(ReplCommand::Code(10)),
        ("code", Some(n)) => n
            .parse()
            .map(ReplCommand::Code)
            .map_err(|_| format!("':code' expects a line count, got '{}'", n)),
        ("history" | "h", None) => Ok(ReplCommand::History),
        ("help" | "?", None) => Ok(ReplCommand::Help),
        ("quit" | "q" | "exit", None) => Ok(ReplCommand::Quit),
        ("goto" | "g" | "get", None) => Err(format!("':{}' needs an argument", name)),
        _ => Err(format!("Unknown command ':{}' (try :help)", name)),
    }
}

pub const HELP: &str = "\
:time              current simulation time
:clock [n]         current cycle, or move by n cycles (negative rewinds)
:goto <t>          go to time t (e.g. 1500, 20 ns); +t/-t is relative
:vars              list all signals
:get <signal>      value of a signal
:step              execute one source statement
:code [n]          n lines of source around the active statement
:history           recent engine commands
:quit              close the simulator and exit
anything else is sent to the simulator as-is";
