use serde::Serialize;

use crate::cmd::{connect, ConnectionArgs, ResetArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct ResetOutput {
    device: &'static str,
    reset: bool,
}

pub fn run(args: ResetArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.device.bind(connect(connection)?);
    device
        .reset()
        .map_err(|err| device_error("reset failed", err))?;

    let name = args.device.network().name();
    print_record(
        &ResetOutput {
            device: name,
            reset: true,
        },
        &[("device", name.to_string()), ("reset", "true".to_string())],
        format,
    );
    Ok(SUCCESS)
}
