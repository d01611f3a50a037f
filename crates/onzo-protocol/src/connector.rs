use onzo_transport::{HidConfig, HidTransport};
use tracing::info;

use crate::client::{Client, ClientConfig};
use crate::error::Result;

/// Open the configured HID device and wrap it in a client with defaults.
pub fn open(hid: &HidConfig) -> Result<Client<HidTransport>> {
    open_with_config(hid, ClientConfig::default())
}

/// Open the configured HID device with explicit client configuration.
pub fn open_with_config(hid: &HidConfig, config: ClientConfig) -> Result<Client<HidTransport>> {
    let transport = HidTransport::open(hid).map_err(onzo_frame::FrameError::from)?;
    info!(
        vendor_id = hid.vendor_id,
        product_id = hid.product_id,
        read_timeout_ms = config.frame.read_timeout.as_millis() as u64,
        "client connected"
    );
    Ok(Client::with_config(transport, config))
}
