mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ConnectionArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "onzo", version, about = "Onzo energy monitor CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.connection, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::DeviceKind;

    #[test]
    fn parses_get_subcommand() {
        let cli = Cli::try_parse_from(["onzo", "get", "clamp", "EAR"])
            .expect("get args should parse");
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.device, DeviceKind::Clamp);
                assert_eq!(args.field, "EAR");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn connection_flags_are_global() {
        let cli = Cli::try_parse_from([
            "onzo",
            "read",
            "--vid",
            "0x1234",
            "--pid",
            "99",
            "--unit",
            "2",
            "--simulate",
        ])
        .expect("read args should parse");

        assert!(matches!(cli.command, Command::Read));
        assert_eq!(cli.connection.vid, 0x1234);
        assert_eq!(cli.connection.pid, 99);
        assert_eq!(cli.connection.unit, 2);
        assert!(cli.connection.simulate);
    }

    #[test]
    fn rates_require_both_values() {
        let err = Cli::try_parse_from(["onzo", "rates", "--standing-charge", "0.25"])
            .expect_err("lone standing charge should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn bulk_accepts_stream_codes() {
        let cli = Cli::try_parse_from(["onzo", "bulk", "clamp", "Q", "--max-blocks", "4"])
            .expect("bulk args should parse");
        match cli.command {
            Command::Bulk(args) => {
                assert_eq!(args.stream, onzo_protocol::StreamType::PowerReactiveFine);
                assert_eq!(args.max_blocks, 4);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_device() {
        assert!(Cli::try_parse_from(["onzo", "reset", "fridge"]).is_err());
    }
}
