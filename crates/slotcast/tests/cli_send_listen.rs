#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use slotcast_transport::{AddressResolver, ResolverConfig, Scope, SlotConfig};

const MACHINE: &str = "clihost";

fn unique_temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "slotcast-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

fn slotcast(runtime_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_slotcast"));
    cmd.arg("--log-level")
        .arg("error")
        .arg("--machine-name")
        .arg(MACHINE)
        .arg("--runtime-dir")
        .arg(runtime_dir);
    cmd
}

fn slot_path(runtime_dir: &Path, channel: &str) -> PathBuf {
    let config = ResolverConfig {
        machine_name: MACHINE.to_string(),
    };
    let address = AddressResolver::new(Scope::Local, &config).resolve(channel);
    SlotConfig::with_runtime_dir(runtime_dir).slot_path(&address)
}

fn send(runtime_dir: &Path, channel: &str, message: &str) -> Output {
    slotcast(runtime_dir)
        .arg("send")
        .arg(channel)
        .arg("--data")
        .arg(message)
        .output()
        .expect("send command should run")
}

/// Retry until the listener's read side is open.
fn send_when_ready(runtime_dir: &Path, channel: &str, message: &str) -> Output {
    let deadline = Instant::now() + Duration::from_secs(5);
    let slot = slot_path(runtime_dir, channel);
    loop {
        if slot.exists() {
            let output = send(runtime_dir, channel, message);
            if output.status.success() || Instant::now() >= deadline {
                return output;
            }
        } else if Instant::now() >= deadline {
            return send(runtime_dir, channel, message);
        }
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn send_without_listener_exits_with_transport_error() {
    let dir = unique_temp_dir("absent");
    let output = send(&dir, "updates", "v2");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("try again later"), "stderr: {stderr}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn blank_channel_is_usage_error() {
    let dir = unique_temp_dir("blank");
    let output = send(&dir, "   ", "v2");

    assert_eq!(output.status.code(), Some(64));
    assert!(!dir.exists(), "validation must happen before any I/O");
}

#[test]
fn missing_message_is_usage_error() {
    let dir = unique_temp_dir("nomsg");
    let output = slotcast(&dir)
        .arg("send")
        .arg("updates")
        .output()
        .expect("send command should run");

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("message is required"), "stderr: {stderr}");
}

#[test]
fn listen_prints_sent_message() {
    let dir = unique_temp_dir("roundtrip");
    let child = slotcast(&dir)
        .arg("--format")
        .arg("json")
        .arg("listen")
        .arg("updates")
        .arg("--count")
        .arg("1")
        .arg("--idle-timeout")
        .arg("10s")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("listen command should start");

    let sent = send_when_ready(&dir, "updates", "v2");
    assert!(
        sent.status.success(),
        "send failed: {}",
        String::from_utf8_lossy(&sent.stderr)
    );

    let output = child
        .wait_with_output()
        .expect("listen command should finish");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"channel\":\"updates\""), "stdout: {stdout}");
    assert!(stdout.contains("\"message\":\"v2\""), "stdout: {stdout}");
    assert!(
        !slot_path(&dir, "updates").exists(),
        "listener should remove its slot on exit"
    );
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn listen_idle_timeout_exits_with_timeout() {
    let dir = unique_temp_dir("idle");
    let output = slotcast(&dir)
        .arg("listen")
        .arg("quiet")
        .arg("--idle-timeout")
        .arg("300ms")
        .output()
        .expect("listen command should run");

    assert_eq!(output.status.code(), Some(124));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn resolve_reports_address_and_lock_name() {
    let dir = unique_temp_dir("resolve");
    let output = slotcast(&dir)
        .arg("--format")
        .arg("json")
        .arg("resolve")
        .arg("updates")
        .output()
        .expect("resolve command should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("resolve output should be JSON");
    assert_eq!(
        value["address"],
        r"\\clihost\mailslot\slotcast\v1\updates"
    );
    assert_eq!(value["lock_name"], "..clihost.mailslot.slotcast.v1.updates");
    assert_eq!(value["scope"], "local");
}

#[test]
fn network_scope_resolves_to_wildcard_target() {
    let dir = unique_temp_dir("network");
    let output = slotcast(&dir)
        .arg("--scope")
        .arg("network")
        .arg("--format")
        .arg("raw")
        .arg("resolve")
        .arg("updates")
        .output()
        .expect("resolve command should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r"\\*\mailslot\slotcast\v1\updates"
    );
}
