use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use onzo_device::Clamp;
use tracing::{info, warn};

use crate::cmd::read::{apparent_power, Reading};
use crate::cmd::{connect, parse_duration, ConnectionArgs, MonitorArgs, Transport};
use crate::exit::{device_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{now_unix_seconds, print_record, OutputFormat};

/// Reactive power is refreshed by the clamp about every 15 s.
const REACTIVE_EVERY: u64 = 15;

/// Battery voltage changes slowly; polling it drains the clamp.
const BATTERY_EVERY: u64 = 600;

pub fn run(args: MonitorArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let clamp = Clamp::shared(connect(connection)?);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut poller = Poller::default();
    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|n| poller.tick >= n) {
            break;
        }

        match poller.poll(&clamp) {
            Ok(reading) => print_record(&reading, &reading.fields(), format),
            Err(err) if err.is_timeout() => warn!(tick = poller.tick, "sample timed out"),
            Err(err) => return Err(device_error("sample failed", err)),
        }
        poller.tick += 1;

        if args.count.is_some_and(|n| poller.tick >= n) {
            break;
        }
        sleep_while_running(interval, &running);
    }

    info!(samples = poller.tick, "monitor stopped");
    Ok(SUCCESS)
}

/// Sampling schedule: real power and energy every tick, the slower
/// readings only on their own cadence. Stale values are reused in between.
#[derive(Debug, Default)]
struct Poller {
    tick: u64,
    reactive: Option<u64>,
    battery: Option<u64>,
}

impl Poller {
    fn poll(&mut self, clamp: &Clamp<Transport>) -> onzo_device::Result<Reading> {
        let power = clamp.power()?;
        if self.tick % REACTIVE_EVERY == 0 || self.reactive.is_none() {
            self.reactive = Some(clamp.power_vars()?);
        }
        if self.tick % BATTERY_EVERY == 0 || self.battery.is_none() {
            self.battery = Some(clamp.battery_volts()?);
        }
        let reactive_power = self.reactive.unwrap_or_default();

        Ok(Reading {
            timestamp: now_unix_seconds(),
            power,
            reactive_power,
            apparent_power: apparent_power(power, reactive_power),
            cumulative_kwh: clamp.cumulative_kwh()?,
            battery_volts: self.battery.unwrap_or_default(),
        })
    }
}

fn sleep_while_running(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
