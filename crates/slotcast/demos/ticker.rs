//! Bind a channel and broadcast a few messages to it from another thread.
//!
//! Run with:
//!   cargo run -p slotcast --example ticker
//!
//! In another terminal, the same channel can be fed by the CLI:
//!   cargo run -p slotcast --features cli -- send ticker --data hello

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::Duration;

    use slotcast::broadcast::{BroadcastConfig, Broadcaster, ChannelListener};

    let config = BroadcastConfig::default();
    let mut listener = ChannelListener::bind("ticker", &config)?;
    eprintln!("Listening on {}", listener.address());

    let broadcaster = Broadcaster::with_config(config);
    let sender = std::thread::spawn(move || {
        for tick in 1..=3 {
            if let Err(err) = broadcaster.send_to_channel("ticker", &format!("tick {tick}")) {
                eprintln!("send failed: {err}");
            }
            std::thread::sleep(Duration::from_millis(200));
        }
    });

    while let Some(frame) = listener.recv_timeout(Duration::from_secs(2))? {
        println!("{}: {}", frame.channel, frame.message);
    }

    let _ = sender.join();
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("the ticker demo needs a receive side, which is Unix-only");
}
