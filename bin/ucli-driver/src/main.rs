//! ucli-driver - interactive console over a simulator session
//!
//! Launches the simulator, performs the startup handshake and then reads
//! commands from stdin until `:quit` or end of input.

mod repl;

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use ucli_driver::protocol::format_time;
use ucli_driver::{handle_startup_error, load_config, Session};

use repl::{parse_line, ReplCommand, HELP};

/// Command line options
#[derive(Debug, Default)]
struct CliArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Simulator command line
    command: Vec<String>,
}

impl CliArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        let args: Vec<String> = env::args().collect();
        let mut cli = CliArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" if cli.command.is_empty() => {
                    let path = args
                        .get(i + 1)
                        .ok_or_else(|| anyhow!("Missing config file path"))?;
                    cli.config_path = Some(PathBuf::from(path));
                    i += 1;
                }
                "--debug" | "-d" if cli.command.is_empty() => {
                    cli.debug = true;
                }
                "--help" | "-h" if cli.command.is_empty() => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-V" if cli.command.is_empty() => {
                    println!("{} v{}", ucli_driver::NAME, ucli_driver::VERSION);
                    process::exit(0);
                }
                "--" => {
                    cli.command.extend(args[i + 1..].iter().cloned());
                    break;
                }
                arg if arg.starts_with('-') && cli.command.is_empty() => {
                    return Err(anyhow!("Unknown option: {}", arg));
                }
                // everything from the simulator path on belongs to the simulator
                arg => cli.command.push(arg.to_string()),
            }
            i += 1;
        }

        if cli.command.is_empty() {
            return Err(anyhow!("Missing simulator executable"));
        }
        Ok(cli)
    }

    /// Simulator command line with words quoted for re-splitting
    fn command_line(&self) -> String {
        self.command
            .iter()
            .map(|word| {
                if word.is_empty() || word.contains(|c: char| c.is_whitespace() || "'\"\\".contains(c)) {
                    format!("'{}'", word.replace('\'', r"'\''"))
                } else {
                    word.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Print help information
fn print_help() {
    println!("{} - {}", ucli_driver::NAME, ucli_driver::DESCRIPTION);
    println!();
    println!("USAGE:");
    println!("    ucli-driver [OPTIONS] <SIMULATOR> [SIMULATOR ARGS...]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -h, --help             Print this help message");
    println!("    -V, --version          Print version information");
    println!();
    println!("CONSOLE COMMANDS:");
    for line in HELP.lines() {
        println!("    {}", line);
    }
    println!();
    println!("CONFIGURATION:");
    println!("    Configuration files are searched in this order:");
    println!("    1. Path specified with --config");
    println!("    2. $UCLI_DRIVER_CONFIG");
    println!("    3. ./.ucli-driver.toml or ./.ucli-driver.json");
    println!("    4. $XDG_CONFIG_HOME/ucli-driver/config.toml");
    println!("    5. ~/.ucli-driver.toml");
    println!("    6. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    UCLI_DRIVER_CONFIG     Path to configuration file");
    println!("    UCLI_DRIVER_DEBUG      Enable debug logging (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

fn init_logging(debug: bool) {
    let debug = debug
        || env::var("UCLI_DRIVER_DEBUG").map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"));
    let log_level = if debug { "debug" } else { "warn" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = match CliArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!();
            print_help();
            process::exit(2);
        }
    };

    init_logging(args.debug);
    info!("Starting {} v{}", ucli_driver::NAME, ucli_driver::VERSION);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = load_config(args.config_path.as_deref()).context("Failed to load configuration")?;
    let command_line = args.command_line();
    debug!("Simulator command line: {}", command_line);

    let session = match Session::launch(&command_line, config).await {
        Ok(session) => session,
        Err(e) => return Err(anyhow!(handle_startup_error(&e))),
    };
    println!(
        "Clock '{}', period {} ps. Type :help for commands.",
        session.clock().signal,
        session.clock().period_ps
    );

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"sim> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        if command == ReplCommand::Quit {
            break;
        }
        dispatch(&session, command).await;

        if session.controller().is_terminated() {
            warn!("Simulator has exited");
            println!("Simulator has exited.");
            break;
        }
    }

    session.close();
    Ok(())
}

async fn dispatch(session: &Session, command: ReplCommand) {
    match command {
        ReplCommand::Time => match session.get_time().await {
            Some(ps) => println!("{}", format_time(ps)),
            None => println!("simulation has ended"),
        },
        ReplCommand::Clock(None) => match session.get_clock().await {
            Some(cycle) => println!("cycle {}", cycle),
            None => println!("simulation has ended"),
        },
        ReplCommand::Clock(Some(cycles)) => {
            let outcome = session.clock_cycle(cycles).await;
            report(outcome.success, &outcome.diagnostic);
        }
        ReplCommand::Goto { target, relative } => {
            let outcome = session.set_time_str(&target, relative).await;
            report(outcome.success, &outcome.diagnostic);
        }
        ReplCommand::Vars => {
            for var in session.list_vars().await {
                println!("{:<40} {}", var.name, var.kind);
            }
        }
        ReplCommand::Get(signal) => println!("{} = {}", signal, session.get_var(&signal).await),
        ReplCommand::Step => print_lines(&session.step_next().await),
        ReplCommand::Code(n) => print_lines(&session.get_code(n).await),
        ReplCommand::History => {
            for record in session.history() {
                if let Some(cmd) = record.command {
                    println!(
                        "{}  {:<30} {} lines",
                        record.completed_at.format("%H:%M:%S"),
                        cmd,
                        record.lines.len()
                    );
                }
            }
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Raw(text) => match session.execute(&text).await {
            Ok(lines) => print_lines(&lines),
            Err(e) => println!("{}", e),
        },
        ReplCommand::Quit | ReplCommand::Empty => {}
    }
}

fn report(success: bool, diagnostic: &str) {
    if !diagnostic.is_empty() {
        println!("{}", diagnostic);
    }
    if !success {
        println!("(failed)");
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
