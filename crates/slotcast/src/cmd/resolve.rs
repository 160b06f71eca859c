use slotcast_broadcast::Broadcaster;

use crate::cmd::{Context, ResolveArgs};
use crate::exit::{broadcast_error, CliResult, SUCCESS};
use crate::output::{print_address, AddressOutput};

pub fn run(args: ResolveArgs, ctx: &Context) -> CliResult<i32> {
    let broadcaster = Broadcaster::with_config(ctx.config.clone());
    let address = broadcaster
        .resolve(&args.channel)
        .map_err(|err| broadcast_error("resolve failed", err))?;

    let slot = &ctx.config.slot;
    let slot_path = slot.slot_path(&address);
    let lock_path = slot.lock_path(&address);
    let out = AddressOutput {
        channel: address.channel(),
        scope: address.scope().as_str(),
        address: address.as_str(),
        lock_name: address.object_name(),
        slot_path: &slot_path,
        lock_path: &lock_path,
    };
    print_address(&out, ctx.format);

    Ok(SUCCESS)
}
