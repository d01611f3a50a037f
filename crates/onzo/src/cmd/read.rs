use onzo_device::Clamp;
use serde::Serialize;

use crate::cmd::{connect, ConnectionArgs, Transport};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{now_unix_seconds, print_record, OutputFormat};

/// One sample of clamp readings.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: u64,
    pub power: u64,
    pub reactive_power: u64,
    pub apparent_power: u64,
    pub cumulative_kwh: f64,
    pub battery_volts: u64,
}

impl Reading {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("timestamp", self.timestamp.to_string()),
            ("power", self.power.to_string()),
            ("reactive_power", self.reactive_power.to_string()),
            ("apparent_power", self.apparent_power.to_string()),
            ("cumulative_kwh", format!("{:.4}", self.cumulative_kwh)),
            ("battery_volts", self.battery_volts.to_string()),
        ]
    }
}

/// `sqrt(real² + reactive²)`, truncated.
pub fn apparent_power(real: u64, reactive: u64) -> u64 {
    let (real, reactive) = (real as f64, reactive as f64);
    (real * real + reactive * reactive).sqrt() as u64
}

pub fn run(connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let clamp = Clamp::shared(connect(connection)?);
    let reading = sample(&clamp).map_err(|err| device_error("read failed", err))?;
    print_record(&reading, &reading.fields(), format);
    Ok(SUCCESS)
}

fn sample(clamp: &Clamp<Transport>) -> onzo_device::Result<Reading> {
    let power = clamp.power()?;
    let reactive_power = clamp.power_vars()?;
    Ok(Reading {
        timestamp: now_unix_seconds(),
        power,
        reactive_power,
        apparent_power: apparent_power(power, reactive_power),
        cumulative_kwh: clamp.cumulative_kwh()?,
        battery_volts: clamp.battery_volts()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apparent_power_truncates() {
        assert_eq!(apparent_power(3, 4), 5);
        assert_eq!(apparent_power(1500, 200), 1513);
        assert_eq!(apparent_power(0, 0), 0);
    }
}
