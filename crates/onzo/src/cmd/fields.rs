use serde::Serialize;

use crate::cmd::{connect, ConnectionArgs, GetArgs, SetArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct FieldOutput<'a> {
    device: &'static str,
    field: &'a str,
    value: u64,
}

pub fn get(args: GetArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.device.bind(connect(connection)?);
    let value = device
        .get_field(&args.field)
        .map_err(|err| device_error("get failed", err))?;

    print_field(args.device.network().name(), &args.field, value, format);
    Ok(SUCCESS)
}

pub fn set(args: SetArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.device.bind(connect(connection)?);
    device
        .set_field(&args.field, args.value)
        .map_err(|err| device_error("set failed", err))?;

    // Read back so the output shows what the device actually holds.
    let value = device
        .get_field(&args.field)
        .map_err(|err| device_error("read back failed", err))?;
    print_field(args.device.network().name(), &args.field, value, format);
    Ok(SUCCESS)
}

fn print_field(device: &'static str, field: &str, value: u64, format: OutputFormat) {
    let out = FieldOutput {
        device,
        field,
        value,
    };
    print_record(
        &out,
        &[
            ("device", device.to_string()),
            ("field", field.to_string()),
            ("value", value.to_string()),
        ],
        format,
    );
}
