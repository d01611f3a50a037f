use std::time::Duration;

use hidapi::{HidApi, HidDevice, HidError};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{ReportTransport, REPORT_SIZE};

/// USB identifiers used to locate the display's HID interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidConfig {
    /// USB vendor id. Default: `0x04D8`.
    pub vendor_id: u16,
    /// USB product id. Default: `0x003F`.
    pub product_id: u16,
    /// Index among matching devices, in enumeration order.
    pub unit: usize,
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            vendor_id: HidTransport::DEFAULT_VENDOR_ID,
            product_id: HidTransport::DEFAULT_PRODUCT_ID,
            unit: 0,
        }
    }
}

/// USB HID report transport.
///
/// Owns an open device handle. Dropping the transport (or calling
/// [`HidTransport::close`]) releases it.
pub struct HidTransport {
    device: HidDevice,
    config: HidConfig,
}

impl HidTransport {
    pub const DEFAULT_VENDOR_ID: u16 = 0x04D8;
    pub const DEFAULT_PRODUCT_ID: u16 = 0x003F;

    /// Open the `unit`-th attached device matching the configured ids.
    pub fn open(config: &HidConfig) -> Result<Self> {
        let open_failed = |e: HidError| {
            map_hid_error(e, |reason| TransportError::Open {
                vendor_id: config.vendor_id,
                product_id: config.product_id,
                reason,
            })
        };
        let api = HidApi::new().map_err(open_failed)?;

        let info = api
            .device_list()
            .filter(|d| d.vendor_id() == config.vendor_id && d.product_id() == config.product_id)
            .nth(config.unit)
            .ok_or(TransportError::NotFound {
                vendor_id: config.vendor_id,
                product_id: config.product_id,
                unit: config.unit,
            })?;

        debug!(path = ?info.path(), "opening hid device");
        let device = info.open_device(&api).map_err(open_failed)?;

        info!(
            vendor_id = format_args!("{:04x}", config.vendor_id),
            product_id = format_args!("{:04x}", config.product_id),
            unit = config.unit,
            "hid device opened"
        );

        Ok(Self {
            device,
            config: *config,
        })
    }

    /// Release the device handle.
    pub fn close(self) {
        info!(unit = self.config.unit, "hid device closed");
    }

    /// Configuration this transport was opened with.
    pub fn config(&self) -> &HidConfig {
        &self.config
    }
}

impl ReportTransport for HidTransport {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<usize> {
        self.device
            .write(report)
            .map_err(|e| map_hid_error(e, TransportError::Device))
    }

    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE], timeout: Duration) -> Result<usize> {
        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        self.device
            .read_timeout(buf, millis)
            .map_err(|e| map_hid_error(e, TransportError::Device))
    }

    fn transport_name(&self) -> &'static str {
        "usb-hid"
    }
}

/// Keep OS-level I/O failures (such as a permission error on the device
/// node) as [`TransportError::Io`]; everything else goes through `other`.
fn map_hid_error(err: HidError, other: impl FnOnce(String) -> TransportError) -> TransportError {
    match err {
        HidError::IoError { error } => TransportError::Io(error),
        err => other(err.to_string()),
    }
}

impl std::fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidTransport")
            .field("config", &self.config)
            .finish()
    }
}
