use onzo_protocol::{Client, NetworkId, SharedClient};
use onzo_transport::ReportTransport;

use crate::device::Device;
use crate::error::Result;
use crate::registers::CLAMP;

/// Raw `EAR` counts per kilowatt-hour.
pub const EAR_PER_KWH: f64 = 10_000.0;

/// The power-measuring clamp.
#[derive(Debug)]
pub struct Clamp<T> {
    device: Device<T>,
}

impl<T: ReportTransport> Clamp<T> {
    pub fn new(client: Client<T>) -> Self {
        Self {
            device: Device::new(client, NetworkId::Clamp, CLAMP),
        }
    }

    pub fn shared(client: SharedClient<T>) -> Self {
        Self {
            device: Device::shared(client, NetworkId::Clamp, CLAMP),
        }
    }

    /// Generic register access.
    pub fn device(&self) -> &Device<T> {
        &self.device
    }

    pub fn into_device(self) -> Device<T> {
        self.device
    }

    /// Real power, in watts.
    pub fn power(&self) -> Result<u64> {
        self.device.get_field("power")
    }

    /// Reactive power, in VAr. The clamp only refreshes it every ~15 s.
    pub fn power_vars(&self) -> Result<u64> {
        self.device.get_field("powervars")
    }

    pub fn battery_volts(&self) -> Result<u64> {
        self.device.get_field("batteryvolts")
    }

    /// Cumulative energy from the `EAR` accumulator, in kWh.
    pub fn cumulative_kwh(&self) -> Result<f64> {
        Ok(self.device.get_field("EAR")? as f64 / EAR_PER_KWH)
    }
}
