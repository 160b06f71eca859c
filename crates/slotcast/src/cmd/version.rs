use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("slotcast {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: slotcast");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("SLOTCAST_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("slot_transport: {}", slot_transport());
    println!("frame_chunk_size: {}", slotcast_frame::DEFAULT_CHUNK_SIZE);

    Ok(SUCCESS)
}

fn slot_transport() -> &'static str {
    if cfg!(windows) {
        "mailslot"
    } else {
        "fifo"
    }
}
