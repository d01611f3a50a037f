use onzo_device::Display;
use serde::Serialize;

use crate::cmd::{connect, ConnectionArgs, EacArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct EacOutput {
    estimated_annual_consumption: u64,
    corrected: bool,
}

pub fn run(args: EacArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let display = Display::shared(connect(connection)?);

    if let Some(watt_hours) = args.set {
        display
            .set_estimated_annual_consumption(watt_hours)
            .map_err(|err| device_error("set eac failed", err))?;
    }

    let value = if args.corrected {
        display.get_estimated_annual_consumption_corrected()
    } else {
        display.get_estimated_annual_consumption()
    }
    .map_err(|err| device_error("get eac failed", err))?;

    let out = EacOutput {
        estimated_annual_consumption: value,
        corrected: args.corrected,
    };
    print_record(
        &out,
        &[
            ("estimated_annual_consumption", value.to_string()),
            ("corrected", args.corrected.to_string()),
        ],
        format,
    );
    Ok(SUCCESS)
}
