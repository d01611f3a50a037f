use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use onzo_device::{Device, RegisterMap, CLAMP, DISPLAY};
use onzo_frame::FrameConfig;
use onzo_protocol::{Client, ClientConfig, NetworkId, SharedClient, Simulator, StreamType};
use onzo_transport::ReportTransport;
use tracing::info;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod bulk;
pub mod eac;
pub mod fields;
pub mod monitor;
pub mod rates;
pub mod read;
pub mod registers;
pub mod reset;
pub mod version;

/// Transport used by every command: real hardware or the simulator.
pub type Transport = Box<dyn ReportTransport + Send>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a device's register table.
    Registers(RegistersArgs),
    /// Read a named field.
    Get(GetArgs),
    /// Write a named field.
    Set(SetArgs),
    /// Print one snapshot of power, energy and battery readings.
    Read,
    /// Poll readings until interrupted.
    Monitor(MonitorArgs),
    /// Show or set the display's tariff rates.
    Rates(RatesArgs),
    /// Show or set the display's estimated annual consumption.
    Eac(EacArgs),
    /// Reset a device.
    Reset(ResetArgs),
    /// Fetch bulk data blocks.
    Bulk(BulkArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Registers(args) => registers::run(args, format),
        Command::Get(args) => fields::get(args, connection, format),
        Command::Set(args) => fields::set(args, connection, format),
        Command::Read => read::run(connection, format),
        Command::Monitor(args) => monitor::run(args, connection, format),
        Command::Rates(args) => rates::run(args, connection, format),
        Command::Eac(args) => eac::run(args, connection, format),
        Command::Reset(args) => reset::run(args, connection, format),
        Command::Bulk(args) => bulk::run(args, connection, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DeviceKind {
    Clamp,
    Display,
}

impl DeviceKind {
    pub fn network(self) -> NetworkId {
        match self {
            DeviceKind::Clamp => NetworkId::Clamp,
            DeviceKind::Display => NetworkId::Display,
        }
    }

    pub fn registers(self) -> RegisterMap {
        match self {
            DeviceKind::Clamp => CLAMP,
            DeviceKind::Display => DISPLAY,
        }
    }

    pub fn bind(self, client: SharedClient<Transport>) -> Device<Transport> {
        Device::shared(client, self.network(), self.registers())
    }
}

/// Options shared by every command that talks to a device.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// USB vendor id (decimal or 0x-prefixed hex).
    #[arg(
        long,
        global = true,
        value_parser = parse_u16,
        default_value = "0x04D8",
        env = "ONZO_VID"
    )]
    pub vid: u16,
    /// USB product id (decimal or 0x-prefixed hex).
    #[arg(
        long,
        global = true,
        value_parser = parse_u16,
        default_value = "0x003F",
        env = "ONZO_PID"
    )]
    pub pid: u16,
    /// Index among attached devices with matching ids.
    #[arg(long, global = true, default_value_t = 0)]
    pub unit: usize,
    /// Per-report read timeout (e.g. 5s, 500ms).
    #[arg(long, global = true, default_value = "5s")]
    pub timeout: String,
    /// Use a built-in simulated device instead of USB hardware.
    #[arg(long, global = true)]
    pub simulate: bool,
}

#[derive(Args, Debug)]
pub struct RegistersArgs {
    /// Device whose table to list.
    pub device: DeviceKind,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    pub device: DeviceKind,
    /// Field name, as listed by `registers`.
    pub field: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub device: DeviceKind,
    /// Field name, as listed by `registers`.
    pub field: String,
    /// Raw value; wider than the field's registers is truncated.
    pub value: u64,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Time between samples (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Stop after N samples.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RatesArgs {
    /// Standing charge per day, in currency units.
    #[arg(long, requires = "unit_rate")]
    pub standing_charge: Option<f64>,
    /// Price per kWh, in currency units.
    #[arg(long, requires = "standing_charge")]
    pub unit_rate: Option<f64>,
}

#[derive(Args, Debug)]
pub struct EacArgs {
    /// Store a new estimate, in watt-hours.
    #[arg(long, value_name = "WH")]
    pub set: Option<f64>,
    /// Combine the register words as `(hi << 16) + lo`.
    #[arg(long)]
    pub corrected: bool,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    pub device: DeviceKind,
}

#[derive(Args, Debug)]
pub struct BulkArgs {
    pub device: DeviceKind,
    /// Stream code (E, e, P, p, Q, q) or name (e.g. energy-high-res).
    pub stream: StreamType,
    /// First block to fetch.
    #[arg(long, default_value_t = 0)]
    pub block_id: u16,
    /// Maximum number of blocks to fetch.
    #[arg(long, default_value_t = 1)]
    pub max_blocks: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the configured connection as a client shared by clamp and display.
pub fn connect(args: &ConnectionArgs) -> CliResult<SharedClient<Transport>> {
    let config = ClientConfig {
        frame: FrameConfig {
            read_timeout: parse_duration(&args.timeout)?,
            ..FrameConfig::default()
        },
    };

    let transport: Transport = if args.simulate {
        info!("using simulated device");
        Box::new(demo_simulator())
    } else {
        open_hid(args)?
    };
    Ok(Client::with_config(transport, config).into_shared())
}

#[cfg(feature = "hidapi")]
fn open_hid(args: &ConnectionArgs) -> CliResult<Transport> {
    let config = onzo_transport::HidConfig {
        vendor_id: args.vid,
        product_id: args.pid,
        unit: args.unit,
    };
    let transport = onzo_transport::HidTransport::open(&config)
        .map_err(|err| crate::exit::transport_error("open failed", err))?;
    Ok(Box::new(transport))
}

#[cfg(not(feature = "hidapi"))]
fn open_hid(args: &ConnectionArgs) -> CliResult<Transport> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        format!(
            "cannot open {:04x}:{:04x} (unit {}): built without the hidapi feature; use --simulate",
            args.vid, args.pid, args.unit
        ),
    ))
}

/// Simulator preloaded with plausible readings.
fn demo_simulator() -> Simulator {
    let clamp = NetworkId::Clamp;
    let display = NetworkId::Display;
    let mut sim = Simulator::new()
        // power 1500 W, 200 VAr, 3.012 V
        .with_register(clamp, 5, 1500)
        .with_register(clamp, 14, 200)
        .with_register(clamp, 18, 3012)
        // EAR 123456789 = 12345.6789 kWh
        .with_register(clamp, 16, 0xCD15)
        .with_register(clamp, 17, 0x075B)
        // 2026-10-19 14:30
        .with_register(display, 1, 30)
        .with_register(display, 2, 14)
        .with_register(display, 3, 19)
        .with_register(display, 4, 10)
        .with_register(display, 5, 2026)
        // standing charge 0.25, unit rate 0.15
        .with_register(display, 129, 2500)
        .with_register(display, 131, 1500);
    sim.set_network_list(vec![clamp.code(), display.code()]);
    sim.set_bulk(clamp, StreamType::EnergyLowRes, 2, vec![0x10, 0x00, 0x20, 0x00]);
    sim
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

fn parse_u16(input: &str) -> Result<u16, String> {
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid id '{input}': {err}"))
}
