use serde::Serialize;

use crate::cmd::RegistersArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_rows, OutputFormat};

#[derive(Serialize)]
struct RegisterRow {
    name: &'static str,
    addresses: &'static [u16],
    words: usize,
}

pub fn run(args: RegistersArgs, format: OutputFormat) -> CliResult<i32> {
    let registers = args.device.registers();
    let records: Vec<RegisterRow> = registers
        .iter()
        .map(|r| RegisterRow {
            name: r.name,
            addresses: r.addresses,
            words: r.words(),
        })
        .collect();

    let rows = records
        .iter()
        .map(|r| {
            let addresses: Vec<String> = r.addresses.iter().map(u16::to_string).collect();
            vec![r.name.to_string(), addresses.join(","), r.words.to_string()]
        })
        .collect();

    print_rows(&records, vec!["NAME", "ADDRESSES", "WORDS"], rows, format);
    Ok(SUCCESS)
}
