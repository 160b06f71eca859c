mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use slotcast_broadcast::{BroadcastConfig, Scope};
use slotcast_transport::{ResolverConfig, SlotConfig};

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "slotcast", version, about = "Channel messaging over broadcast slots")]
struct Cli {
    /// Send scope: this machine only, or every machine in the network domain.
    #[arg(long, value_name = "SCOPE", default_value = "local", global = true)]
    scope: Scope,

    /// Machine name for local-scope addresses. Default: the host name.
    #[arg(long, value_name = "NAME", global = true)]
    machine_name: Option<String>,

    /// Directory holding slot FIFOs and lock files.
    #[arg(long, value_name = "DIR", env = "SLOTCAST_RUNTIME_DIR", global = true)]
    runtime_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn broadcast_config(&self) -> BroadcastConfig {
        let mut config = BroadcastConfig::default().with_scope(self.scope);
        if let Some(name) = &self.machine_name {
            config.resolver = ResolverConfig {
                machine_name: name.clone(),
            };
        }
        if let Some(dir) = &self.runtime_dir {
            config.slot = SlotConfig::with_runtime_dir(dir);
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = Context {
        config: cli.broadcast_config(),
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
    };
    let result = cmd::run(cli.command, &ctx);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
