use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use slotcast_frame::Frame;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    channel: &'a str,
    message: &'a str,
    message_size: usize,
    address: &'a str,
    timestamp: String,
}

pub fn print_frame(frame: &Frame, address: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                channel: &frame.channel,
                message: &frame.message,
                message_size: frame.message.len(),
                address,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "SIZE", "MESSAGE"])
                .add_row(vec![
                    frame.channel.clone(),
                    frame.message.len().to_string(),
                    frame.message.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "channel={} size={} message={}",
                frame.channel,
                frame.message.len(),
                frame.message
            );
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            let _ = writeln!(out, "{}", frame.message);
            let _ = out.flush();
        }
    }
}

/// Everything derived from one channel name.
#[derive(Debug, Serialize)]
pub struct AddressOutput<'a> {
    pub channel: &'a str,
    pub scope: &'a str,
    pub address: &'a str,
    pub lock_name: String,
    pub slot_path: &'a Path,
    pub lock_path: &'a Path,
}

pub fn print_address(out: &AddressOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["channel", out.channel])
                .add_row(vec!["scope", out.scope])
                .add_row(vec!["address", out.address])
                .add_row(vec!["lock name", out.lock_name.as_str()])
                .add_row(vec!["slot path".to_string(), out.slot_path.display().to_string()])
                .add_row(vec!["lock path".to_string(), out.lock_path.display().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Channel:   {} ({})", out.channel, out.scope);
            println!("  Address:   {}", out.address);
            println!("  Lock name: {}", out.lock_name);
            println!("  Slot path: {}", out.slot_path.display());
            println!("  Lock path: {}", out.lock_path.display());
        }
        OutputFormat::Raw => {
            println!("{}", out.address);
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_output_serializes_channel_and_message() {
        let out = FrameOutput {
            channel: "updates",
            message: "v2",
            message_size: 2,
            address: r"\\host\mailslot\slotcast\v1\updates",
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_string(&out).expect("frame output should serialize");
        assert!(json.contains("\"channel\":\"updates\""));
        assert!(json.contains("\"message\":\"v2\""));
    }
}
