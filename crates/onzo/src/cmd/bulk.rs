use serde::Serialize;

use crate::cmd::{connect, BulkArgs, ConnectionArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct BulkOutput {
    device: &'static str,
    stream: &'static str,
    block_id: u16,
    count: u16,
    size: usize,
    data: String,
}

pub fn run(args: BulkArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.device.bind(connect(connection)?);
    let bulk = device
        .get_bulk_data(args.stream, args.block_id, args.max_blocks)
        .map_err(|err| device_error("bulk read failed", err))?;

    let out = BulkOutput {
        device: args.device.network().name(),
        stream: args.stream.name(),
        block_id: args.block_id,
        count: bulk.count,
        size: bulk.data.len(),
        data: hex(&bulk.data),
    };
    print_record(
        &out,
        &[
            ("device", out.device.to_string()),
            ("stream", out.stream.to_string()),
            ("block_id", out.block_id.to_string()),
            ("count", out.count.to_string()),
            ("size", out.size.to_string()),
            ("data", out.data.clone()),
        ],
        format,
    );
    Ok(SUCCESS)
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_encodes_lowercase_pairs() {
        assert_eq!(hex(&[0x00, 0xAB, 0x10]), "00ab10");
        assert_eq!(hex(&[]), "");
    }
}
