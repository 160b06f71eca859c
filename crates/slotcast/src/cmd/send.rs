use std::fs;
use std::io::Read;

use slotcast_broadcast::{Broadcaster, CancellationToken};
use tracing::info;

use crate::cmd::{parse_duration, Context, SendArgs};
use crate::exit::{
    broadcast_error, io_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS, USAGE,
};

pub fn run(args: SendArgs, ctx: &Context) -> CliResult<i32> {
    let message = resolve_message(&args)?;

    let mut config = ctx.config.clone();
    if let Some(timeout) = &args.timeout {
        config.retry.timeout = Some(parse_duration(timeout)?);
    }

    let cancel = CancellationToken::new();
    install_ctrlc_handler(cancel.clone())?;

    let broadcaster = Broadcaster::with_config(config);
    broadcaster
        .send_to_channel_with(&args.channel, &message, &cancel)
        .map_err(|err| broadcast_error("send failed", err))?;

    info!(channel = %args.channel, bytes = message.len(), "message sent");
    Ok(SUCCESS)
}

/// The message is required; an absent one is a usage error, not an empty send.
fn resolve_message(args: &SendArgs) -> CliResult<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return String::from_utf8(bytes).map_err(|_| {
            CliError::new(
                DATA_INVALID,
                format!("{} is not valid UTF-8", path.display()),
            )
        });
    }
    if args.stdin {
        let mut message = String::new();
        std::io::stdin()
            .read_to_string(&mut message)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(message);
    }
    Err(CliError::new(
        USAGE,
        "invalid argument: a message is required (--data, --file or --stdin)",
    ))
}

fn install_ctrlc_handler(cancel: CancellationToken) -> CliResult<()> {
    ctrlc::set_handler(move || cancel.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
