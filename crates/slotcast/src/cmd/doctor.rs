use serde::Serialize;
use slotcast_broadcast::BroadcastConfig;

use crate::cmd::{Context, DoctorArgs};
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, ctx: &Context) -> CliResult<i32> {
    let checks = vec![
        platform_transport_check(),
        machine_name_check(&ctx.config),
        runtime_dir_check(&ctx.config),
        slot_roundtrip_check(&ctx.config),
        scope_check(&ctx.config),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let output = DoctorOutput {
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, ctx.format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("slotcast doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_transport_check() -> CheckResult {
    let detail = if cfg!(windows) {
        "mailslots and named mutexes"
    } else {
        "FIFO slots and flock channel locks"
    };
    CheckResult::new("platform_transport", CheckStatus::Pass, detail)
}

fn machine_name_check(config: &BroadcastConfig) -> CheckResult {
    let name = &config.resolver.machine_name;
    if name.is_empty() || name == "localhost" {
        CheckResult::new(
            "machine_name",
            CheckStatus::Warn,
            format!("host name unavailable, local addresses use {name:?}"),
        )
    } else {
        CheckResult::new("machine_name", CheckStatus::Pass, name.clone())
    }
}

fn scope_check(config: &BroadcastConfig) -> CheckResult {
    CheckResult::new(
        "scope",
        CheckStatus::Info,
        format!(
            "{} scope, {}-byte chunks",
            config.scope, config.frame.chunk_size
        ),
    )
}

#[cfg(unix)]
fn runtime_dir_check(config: &BroadcastConfig) -> CheckResult {
    let dir = &config.slot.runtime_dir;
    let scratch = dir.join(format!(".doctor-{}", std::process::id()));
    let result = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&scratch, b"ok"));
    let _ = std::fs::remove_file(&scratch);

    match result {
        Ok(()) => CheckResult::new(
            "runtime_dir",
            CheckStatus::Pass,
            format!("{} is writable", dir.display()),
        ),
        Err(err) => CheckResult::new(
            "runtime_dir",
            CheckStatus::Fail,
            format!("{} is not writable: {err}", dir.display()),
        ),
    }
}

#[cfg(not(unix))]
fn runtime_dir_check(_config: &BroadcastConfig) -> CheckResult {
    CheckResult::new(
        "runtime_dir",
        CheckStatus::Skip,
        "slots are kernel objects on this platform",
    )
}

/// Bind a throwaway channel and send one message through it.
#[cfg(unix)]
fn slot_roundtrip_check(config: &BroadcastConfig) -> CheckResult {
    use std::time::Duration;

    use slotcast_broadcast::{BroadcastError, Broadcaster, ChannelListener};

    let channel = format!("doctor-check-{}", std::process::id());
    let roundtrip = || -> Result<Option<String>, BroadcastError> {
        let mut listener = ChannelListener::bind(&channel, config)?;
        Broadcaster::with_config(config.clone()).send_to_channel(&channel, "ping")?;
        Ok(listener
            .recv_timeout(Duration::from_secs(1))?
            .map(|frame| frame.message))
    };

    match roundtrip() {
        Ok(Some(message)) if message == "ping" => CheckResult::new(
            "slot_roundtrip",
            CheckStatus::Pass,
            "send and receive on a check channel succeeded",
        ),
        Ok(_) => CheckResult::new(
            "slot_roundtrip",
            CheckStatus::Fail,
            "check message was not received",
        ),
        Err(err) => CheckResult::new("slot_roundtrip", CheckStatus::Fail, err.to_string()),
    }
}

#[cfg(not(unix))]
fn slot_roundtrip_check(_config: &BroadcastConfig) -> CheckResult {
    CheckResult::new(
        "slot_roundtrip",
        CheckStatus::Skip,
        "no receive side on this platform",
    )
}
