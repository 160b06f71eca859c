use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use slotcast_broadcast::BroadcastConfig;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod listen;
pub mod resolve;
pub mod send;
pub mod version;

/// Settings shared by every subcommand.
pub struct Context {
    pub config: BroadcastConfig,
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Broadcast one message to a channel.
    Send(SendArgs),
    /// Bind a channel's slot and print received messages.
    Listen(ListenArgs),
    /// Print the address, lock name and paths for a channel.
    Resolve(ResolveArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, ctx),
        Command::Listen(args) => listen::run(args, ctx),
        Command::Resolve(args) => resolve::run(args, ctx),
        Command::Doctor(args) => doctor::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Channel to send to.
    pub channel: String,
    /// Message text.
    #[arg(long, conflicts_with_all = ["file", "stdin"])]
    pub data: Option<String>,
    /// Read the message from a UTF-8 file.
    #[arg(long, conflicts_with_all = ["data", "stdin"])]
    pub file: Option<PathBuf>,
    /// Read the message from stdin.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub stdin: bool,
    /// Give up if the slot has no room for the message after this long
    /// (e.g. 5s, 500ms). A message that has started writing is always
    /// finished.
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Channel to listen on.
    pub channel: String,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit with a timeout status if no message arrives for this long.
    #[arg(long)]
    pub idle_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Channel to resolve.
    pub channel: String,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
