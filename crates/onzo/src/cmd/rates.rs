use onzo_device::Display;
use serde::Serialize;

use crate::cmd::{connect, ConnectionArgs, RatesArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct RatesOutput {
    standing_charge: f64,
    unit_rate: f64,
}

pub fn run(args: RatesArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let display = Display::shared(connect(connection)?);

    if let (Some(standing_charge), Some(unit_rate)) = (args.standing_charge, args.unit_rate) {
        display
            .set_spend_rates(standing_charge, unit_rate)
            .map_err(|err| device_error("set rates failed", err))?;
    }

    let rates = display
        .get_spend_rates()
        .map_err(|err| device_error("get rates failed", err))?;
    let out = RatesOutput {
        standing_charge: rates.standing_charge,
        unit_rate: rates.unit_rate,
    };
    print_record(
        &out,
        &[
            ("standing_charge", format!("{:.4}", out.standing_charge)),
            ("unit_rate", format!("{:.4}", out.unit_rate)),
        ],
        format,
    );
    Ok(SUCCESS)
}
