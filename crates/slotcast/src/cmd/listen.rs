#[cfg(unix)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(unix)]
use std::sync::Arc;
#[cfg(unix)]
use std::time::{Duration, Instant};

#[cfg(unix)]
use slotcast_broadcast::ChannelListener;
#[cfg(unix)]
use tracing::info;

use crate::cmd::{Context, ListenArgs};
use crate::exit::{CliError, CliResult};

/// Upper bound on how long a Ctrl-C goes unnoticed.
#[cfg(unix)]
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[cfg(unix)]
pub fn run(args: ListenArgs, ctx: &Context) -> CliResult<i32> {
    use crate::cmd::parse_duration;
    use crate::exit::{broadcast_error, SUCCESS, TIMEOUT};
    use crate::output::print_frame;

    let idle_timeout = args
        .idle_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;

    let mut listener = ChannelListener::bind(&args.channel, &ctx.config)
        .map_err(|err| broadcast_error("bind failed", err))?;
    info!(channel = %args.channel, address = %listener.address(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut last_frame = Instant::now();

    while running.load(Ordering::SeqCst) {
        let frame = listener
            .recv_timeout(POLL_INTERVAL)
            .map_err(|err| broadcast_error("receive failed", err))?;

        let Some(frame) = frame else {
            if let Some(limit) = idle_timeout {
                if last_frame.elapsed() >= limit {
                    return Err(CliError::new(
                        TIMEOUT,
                        format!("no message on {} within {limit:?}", args.channel),
                    ));
                }
            }
            continue;
        };

        last_frame = Instant::now();
        print_frame(&frame, listener.address().as_str(), ctx.format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

#[cfg(not(unix))]
pub fn run(args: ListenArgs, _ctx: &Context) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        format!("listen {}: no receive side on this platform", args.channel),
    ))
}

#[cfg(unix)]
fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
