use onzo_protocol::{Client, NetworkId, SharedClient};
use onzo_transport::ReportTransport;
use tracing::debug;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::registers::DISPLAY;

/// Register counts per currency unit for tariff values.
pub const RATE_SCALE: f64 = 10_000.0;

/// Largest scaled tariff value written to the display.
pub const RATE_MAX: u16 = 65_534;

/// Watt-hours per stored estimated annual consumption unit.
pub const EAC_UNIT_WH: f64 = 3_600_000.0;

/// Tariff pair stored on the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendRates {
    pub standing_charge: f64,
    pub unit_rate: f64,
}

/// Snapshot of the display's clock registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub minute: u16,
    pub hour: u16,
    pub day: u16,
    pub month: u16,
    pub year: u16,
}

/// The display controller.
#[derive(Debug)]
pub struct Display<T> {
    device: Device<T>,
}

impl<T: ReportTransport> Display<T> {
    pub fn new(client: Client<T>) -> Self {
        Self {
            device: Device::new(client, NetworkId::Display, DISPLAY),
        }
    }

    pub fn shared(client: SharedClient<T>) -> Self {
        Self {
            device: Device::shared(client, NetworkId::Display, DISPLAY),
        }
    }

    pub fn device(&self) -> &Device<T> {
        &self.device
    }

    pub fn into_device(self) -> Device<T> {
        self.device
    }

    /// Store the standing charge and unit rate.
    ///
    /// Each value is scaled by [`RATE_SCALE`], rounded half up and clamped to
    /// `0..=RATE_MAX`. Only the low word of each pair carries data; the high
    /// word is always written as zero. NaN or infinite inputs fail with
    /// [`Error::ValueOutOfRange`] before anything is written.
    pub fn set_spend_rates(&self, standing_charge: f64, unit_rate: f64) -> Result<()> {
        let standing = self.device.lookup("standingcharge")?.addresses;
        let unit = self.device.lookup("unitcost")?.addresses;

        let scaled_standing = scale_rate("standingcharge", standing_charge)?;
        let scaled_unit = scale_rate("unitcost", unit_rate)?;
        debug!(scaled_standing, scaled_unit, "writing spend rates");

        for (addresses, scaled) in [(standing, scaled_standing), (unit, scaled_unit)] {
            let [lo, hi] = pair(addresses)?;
            self.device.set(lo, scaled)?;
            self.device.set(hi, 0)?;
        }
        Ok(())
    }

    /// Read the tariff pair. Only the low word of each register pair is used.
    pub fn get_spend_rates(&self) -> Result<SpendRates> {
        let [standing, _] = pair(self.device.lookup("standingcharge")?.addresses)?;
        let [unit, _] = pair(self.device.lookup("unitcost")?.addresses)?;
        Ok(SpendRates {
            standing_charge: f64::from(self.device.get(standing)?) / RATE_SCALE,
            unit_rate: f64::from(self.device.get(unit)?) / RATE_SCALE,
        })
    }

    /// Store the estimated annual consumption, given in watt-hours, then set
    /// the `configured` flag.
    ///
    /// The value is divided by [`EAC_UNIT_WH`] and truncated. Values that do
    /// not fit the 32-bit register pair fail with [`Error::ValueOutOfRange`]
    /// before anything is written.
    ///
    /// The flag is assumed to be the `configured` register (83); existing
    /// tooling names a device constant for it that is never defined.
    pub fn set_estimated_annual_consumption(&self, watt_hours: f64) -> Result<()> {
        let [lo_addr, hi_addr] = pair(self.device.lookup("EAC")?.addresses)?;
        let units = (watt_hours / EAC_UNIT_WH).trunc();
        if !(0.0..=f64::from(u32::MAX)).contains(&units) {
            return Err(Error::ValueOutOfRange {
                field: "EAC",
                value: watt_hours,
            });
        }
        let units = units as u32;
        let hi = (units >> 16) as u16;
        let lo = (units & 0xFFFF) as u16;
        debug!(units, hi, lo, "writing estimated annual consumption");

        self.device.set(lo_addr, lo)?;
        self.device.set(hi_addr, hi)?;
        self.device.set_field("configured", 1)
    }

    /// Read the estimated annual consumption as `hi << (16 + lo)`.
    ///
    /// This matches existing tooling, not `(hi << 16) + lo`; see
    /// [`Display::get_estimated_annual_consumption_corrected`]. A zero high
    /// word yields zero. Combinations that overflow 64 bits fail with
    /// [`Error::EacOutOfRange`].
    pub fn get_estimated_annual_consumption(&self) -> Result<u64> {
        let (lo, hi) = self.eac_words()?;
        literal_eac(hi, lo).ok_or(Error::EacOutOfRange { hi, lo })
    }

    /// Read the estimated annual consumption as `(hi << 16) + lo`.
    pub fn get_estimated_annual_consumption_corrected(&self) -> Result<u64> {
        let (lo, hi) = self.eac_words()?;
        Ok((u64::from(hi) << 16) + u64::from(lo))
    }

    /// Read the clock registers.
    pub fn clock(&self) -> Result<Clock> {
        let field = |name| self.device.get_field(name).map(|v| v as u16);
        Ok(Clock {
            minute: field("min")?,
            hour: field("hour")?,
            day: field("day")?,
            month: field("month")?,
            year: field("year")?,
        })
    }

    fn eac_words(&self) -> Result<(u16, u16)> {
        let [lo_addr, hi_addr] = pair(self.device.lookup("EAC")?.addresses)?;
        Ok((self.device.get(lo_addr)?, self.device.get(hi_addr)?))
    }
}

fn scale_rate(field: &'static str, value: f64) -> Result<u16> {
    if !value.is_finite() {
        return Err(Error::ValueOutOfRange { field, value });
    }
    Ok((value * RATE_SCALE + 0.5).trunc().clamp(0.0, f64::from(RATE_MAX)) as u16)
}

fn literal_eac(hi: u16, lo: u16) -> Option<u64> {
    if hi == 0 {
        return Some(0);
    }
    let shift = 16 + u32::from(lo);
    let hi = u64::from(hi);
    if shift > hi.leading_zeros() {
        return None;
    }
    Some(hi << shift)
}

fn pair(addresses: &'static [u16]) -> Result<[u16; 2]> {
    match addresses {
        [lo, hi] => Ok([*lo, *hi]),
        _ => Err(Error::ValueOutOfRange {
            field: "register pair",
            value: addresses.len() as f64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use onzo_protocol::{ClientError, CounterIds, Fault, RequestType, Simulator};

    use super::*;

    fn display(sim: Simulator) -> Display<Simulator> {
        Display::new(Client::new(sim).with_transaction_ids(CounterIds::default()))
    }

    fn writes(display: &Display<Simulator>) -> Vec<(u8, u16)> {
        let client = onzo_protocol::lock_shared(display.device().client()).unwrap();
        client
            .get_ref()
            .requests()
            .iter()
            .filter(|r| r.header.message_type == RequestType::SetRegister.code())
            .map(|r| {
                (
                    r.header.register_id,
                    u16::from_le_bytes([r.payload[0], r.payload[1]]),
                )
            })
            .collect()
    }

    #[test]
    fn spend_rates_scale_round_and_zero_high_words() {
        let display = display(Simulator::new());
        display.set_spend_rates(0.2345, 0.14567).unwrap();

        assert_eq!(
            writes(&display),
            vec![(129, 2345), (130, 0), (131, 1457), (132, 0)]
        );
    }

    #[test]
    fn spend_rates_clamp() {
        let display = display(Simulator::new());
        display.set_spend_rates(-1.0, 100.0).unwrap();
        assert_eq!(
            writes(&display),
            vec![(129, 0), (130, 0), (131, 65534), (132, 0)]
        );
    }

    #[test]
    fn spend_rates_reject_non_finite_before_writing() {
        let display = display(Simulator::new());
        for (standing, unit) in [
            (f64::NAN, 0.1),
            (0.1, f64::INFINITY),
            (f64::NEG_INFINITY, 0.1),
        ] {
            assert!(matches!(
                display.set_spend_rates(standing, unit),
                Err(Error::ValueOutOfRange { .. })
            ));
        }
        assert!(matches!(
            display.set_spend_rates(f64::NAN, f64::INFINITY),
            Err(Error::ValueOutOfRange {
                field: "standingcharge",
                ..
            })
        ));
        assert!(writes(&display).is_empty());
    }

    #[test]
    fn spend_rates_read_low_words_only() {
        let sim = Simulator::new()
            .with_register(NetworkId::Display, 129, 2500)
            .with_register(NetworkId::Display, 130, 7)
            .with_register(NetworkId::Display, 131, 1500)
            .with_register(NetworkId::Display, 132, 9);
        let rates = display(sim).get_spend_rates().unwrap();
        assert_eq!(
            rates,
            SpendRates {
                standing_charge: 0.25,
                unit_rate: 0.15
            }
        );
    }

    #[test]
    fn eac_setter_splits_words_and_sets_configured() {
        let display = display(Simulator::new());
        // 70000 units = 0x0001_1170
        display
            .set_estimated_annual_consumption(70_000.0 * EAC_UNIT_WH + 1.0)
            .unwrap();
        assert_eq!(
            writes(&display),
            vec![(133, 0x1170), (134, 0x0001), (83, 1)]
        );
    }

    #[test]
    fn eac_setter_rejects_out_of_range() {
        let display = display(Simulator::new());
        for value in [-EAC_UNIT_WH, 4_294_967_296.0 * EAC_UNIT_WH, f64::NAN] {
            assert!(matches!(
                display.set_estimated_annual_consumption(value),
                Err(Error::ValueOutOfRange { field: "EAC", .. })
            ));
        }
        assert!(writes(&display).is_empty());
    }

    #[test]
    fn eac_getter_keeps_literal_formula() {
        let sim = Simulator::new()
            .with_register(NetworkId::Display, 133, 2)
            .with_register(NetworkId::Display, 134, 3);
        let display = display(sim);
        assert_eq!(display.get_estimated_annual_consumption().unwrap(), 3 << 18);
        assert_eq!(
            display.get_estimated_annual_consumption_corrected().unwrap(),
            (3 << 16) + 2
        );
    }

    #[test]
    fn eac_getter_zero_high_word() {
        let sim = Simulator::new().with_register(NetworkId::Display, 133, 500);
        let display = display(sim);
        assert_eq!(display.get_estimated_annual_consumption().unwrap(), 0);
        assert_eq!(
            display.get_estimated_annual_consumption_corrected().unwrap(),
            500
        );
    }

    #[test]
    fn eac_getter_overflow() {
        let sim = Simulator::new()
            .with_register(NetworkId::Display, 133, 100)
            .with_register(NetworkId::Display, 134, 1);
        assert!(matches!(
            display(sim).get_estimated_annual_consumption(),
            Err(Error::EacOutOfRange { hi: 1, lo: 100 })
        ));
    }

    #[test]
    fn literal_eac_boundaries() {
        assert_eq!(literal_eac(1, 47), Some(1 << 63));
        assert_eq!(literal_eac(1, 48), None);
        assert_eq!(literal_eac(0xFFFF, 32), Some(0xFFFF << 48));
        assert_eq!(literal_eac(0xFFFF, 33), None);
    }

    #[test]
    fn clock_snapshot() {
        let sim = Simulator::new()
            .with_register(NetworkId::Display, 1, 30)
            .with_register(NetworkId::Display, 2, 14)
            .with_register(NetworkId::Display, 3, 19)
            .with_register(NetworkId::Display, 4, 10)
            .with_register(NetworkId::Display, 5, 2026);
        assert_eq!(
            display(sim).clock().unwrap(),
            Clock {
                minute: 30,
                hour: 14,
                day: 19,
                month: 10,
                year: 2026
            }
        );
    }

    #[test]
    fn device_error_stops_spend_rate_writes() {
        let display = display(Simulator::new());
        {
            let mut client = onzo_protocol::lock_shared(display.device().client()).unwrap();
            client.get_mut().fail_on(2, Fault::Error);
        }
        let err = display.set_spend_rates(1.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::Client(ClientError::Device { .. })));
        // The rejected write to 131 is seen; 132 is never attempted.
        assert_eq!(writes(&display), vec![(129, 10000), (130, 0), (131, 10000)]);
        let client = onzo_protocol::lock_shared(display.device().client()).unwrap();
        assert_eq!(client.get_ref().get(NetworkId::Display, 131), 0);
    }
}
