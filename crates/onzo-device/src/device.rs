use bytes::Bytes;
use onzo_protocol::{lock_shared, BulkData, Client, NetworkId, SharedClient, StreamType};
use onzo_transport::ReportTransport;
use tracing::{debug, warn};

use crate::accessor::{Accessor, AccessorTable};
use crate::error::{Error, Result};
use crate::registers::{Register, RegisterMap};

/// A logical device: a network id and a register table bound to a client.
///
/// Each field operation holds the client lock for all of its register
/// transactions, so devices sharing one connection never interleave words
/// of the same field.
pub struct Device<T> {
    client: SharedClient<T>,
    network: NetworkId,
    registers: RegisterMap,
    accessors: AccessorTable,
}

impl<T: ReportTransport> Device<T> {
    /// Bind a dedicated client.
    pub fn new(client: Client<T>, network: NetworkId, registers: RegisterMap) -> Self {
        Self::shared(client.into_shared(), network, registers)
    }

    /// Bind a client shared with other devices.
    pub fn shared(client: SharedClient<T>, network: NetworkId, registers: RegisterMap) -> Self {
        Self {
            client,
            network,
            registers,
            accessors: AccessorTable::build(registers),
        }
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn registers(&self) -> RegisterMap {
        self.registers
    }

    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    pub fn client(&self) -> &SharedClient<T> {
        &self.client
    }

    /// Read one register by address.
    pub fn get(&self, address: u16) -> Result<u16> {
        Ok(lock_shared(&self.client)?.get_register(self.network, address)?)
    }

    /// Write one register by address, returning the acknowledged value.
    pub fn set(&self, address: u16, value: u16) -> Result<u16> {
        Ok(lock_shared(&self.client)?.set_register(self.network, address, value)?)
    }

    pub fn lookup(&self, name: &str) -> Result<&'static Register> {
        self.registers.lookup(name).ok_or_else(|| Error::UnknownRegister {
            name: name.to_string(),
        })
    }

    /// Read a named field, composing its words.
    pub fn get_field(&self, name: &str) -> Result<u64> {
        let register = self.lookup(name)?;
        self.read(register)
    }

    /// Write a named field, splitting it into words.
    ///
    /// Not atomic: if a word fails to write, the words before it stay
    /// modified and nothing is rolled back.
    pub fn set_field(&self, name: &str, value: u64) -> Result<()> {
        let register = self.lookup(name)?;
        self.write(register, value)
    }

    /// Read a register entry. Addresses are listed least significant first,
    /// so the walk runs from the last address to the first.
    pub fn read(&self, register: &Register) -> Result<u64> {
        let mut client = lock_shared(&self.client)?;
        let mut value = 0u64;
        for &address in register.addresses.iter().rev() {
            let word = client.get_register(self.network, address)?;
            value = (value << 16) + u64::from(word);
        }
        debug!(network = %self.network, field = register.name, value, "field read");
        Ok(value)
    }

    /// Write a register entry, least significant word first.
    pub fn write(&self, register: &Register, value: u64) -> Result<()> {
        let mut client = lock_shared(&self.client)?;
        let mut rest = value;
        for &address in register.addresses {
            client.set_register(self.network, address, (rest & 0xFFFF) as u16)?;
            rest >>= 16;
        }
        if rest != 0 {
            warn!(
                network = %self.network,
                field = register.name,
                value,
                max = register.max_value(),
                "value truncated to field width"
            );
        }
        debug!(network = %self.network, field = register.name, value, "field written");
        Ok(())
    }

    /// Call a `get_<field>` or `set_<field>` accessor by name.
    ///
    /// Getters return `Some(value)`; setters take `value` and return `None`.
    pub fn invoke(&self, accessor: &str, value: Option<u64>) -> Result<Option<u64>> {
        match self.accessors.resolve(accessor)? {
            Accessor::Get(register) => self.read(register).map(Some),
            Accessor::Set(register) => {
                let value = value.ok_or_else(|| Error::MissingValue {
                    accessor: accessor.to_string(),
                })?;
                self.write(register, value).map(|()| None)
            }
        }
    }

    pub fn reset(&self) -> Result<()> {
        Ok(lock_shared(&self.client)?.reset(self.network)?)
    }

    pub fn get_bulk_data(
        &self,
        stream: StreamType,
        block_id: u16,
        max_blocks: u16,
    ) -> Result<BulkData> {
        Ok(lock_shared(&self.client)?.get_bulk_data(self.network, stream, block_id, max_blocks)?)
    }

    pub fn get_network_list(&self) -> Result<Bytes> {
        Ok(lock_shared(&self.client)?.get_network_list(self.network)?)
    }
}

impl<T> std::fmt::Debug for Device<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("network", &self.network)
            .field("registers", &self.registers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use onzo_protocol::{ClientError, CounterIds, Fault, RequestType, Simulator};

    use super::*;
    use crate::registers::{CLAMP, DISPLAY};

    pub(crate) fn sim_device(
        network: NetworkId,
        registers: RegisterMap,
        sim: Simulator,
    ) -> Device<Simulator> {
        let client = Client::new(sim).with_transaction_ids(CounterIds::default());
        Device::new(client, network, registers)
    }

    pub(crate) fn with_sim<R>(
        device: &Device<Simulator>,
        f: impl FnOnce(&mut Simulator) -> R,
    ) -> R {
        let mut client = lock_shared(device.client()).unwrap();
        f(client.get_mut())
    }

    fn requested(device: &Device<Simulator>) -> Vec<(u8, u8)> {
        with_sim(device, |sim| {
            sim.requests()
                .iter()
                .map(|r| (r.header.message_type, r.header.register_id))
                .collect()
        })
    }

    #[test]
    fn get_field_composes_words_most_significant_first() {
        let sim = Simulator::new()
            .with_register(NetworkId::Clamp, 16, 0x5678)
            .with_register(NetworkId::Clamp, 17, 0x1234);
        let clamp = sim_device(NetworkId::Clamp, CLAMP, sim);

        assert_eq!(clamp.get_field("EAR").unwrap(), 0x1234 * 65536 + 0x5678);

        let get = RequestType::GetRegister.code();
        assert_eq!(requested(&clamp), vec![(get, 17), (get, 16)]);
    }

    #[test]
    fn set_field_writes_least_significant_first() {
        let clamp = sim_device(NetworkId::Clamp, CLAMP, Simulator::new());
        clamp.set_field("EAR", 0x0001_86A0).unwrap();

        let set = RequestType::SetRegister.code();
        assert_eq!(requested(&clamp), vec![(set, 16), (set, 17)]);
        with_sim(&clamp, |sim| {
            assert_eq!(sim.get(NetworkId::Clamp, 16), 0x86A0);
            assert_eq!(sim.get(NetworkId::Clamp, 17), 0x0001);
            assert_eq!(sim.requests()[0].payload, vec![0xA0, 0x86]);
        });
    }

    #[test]
    fn set_field_drops_bits_beyond_width() {
        let clamp = sim_device(NetworkId::Clamp, CLAMP, Simulator::new());
        clamp.set_field("power", 0x0003_0042).unwrap();
        assert_eq!(clamp.get_field("power").unwrap(), 0x42);
    }

    #[test]
    fn partial_set_field_is_not_rolled_back() {
        let clamp = sim_device(NetworkId::Clamp, CLAMP, Simulator::new());
        with_sim(&clamp, |sim| sim.fail_on(1, Fault::Error));

        let err = clamp.set_field("EAR", 0x0002_0003).unwrap_err();
        assert!(matches!(
            err,
            Error::Client(ClientError::Device {
                request_type: RequestType::SetRegister
            })
        ));
        with_sim(&clamp, |sim| {
            assert_eq!(sim.get(NetworkId::Clamp, 16), 3);
            assert_eq!(sim.get(NetworkId::Clamp, 17), 0);
        });
    }

    #[test]
    fn single_register_access() {
        let sim = Simulator::new().with_register(NetworkId::Display, 5, 42);
        let display = sim_device(NetworkId::Display, DISPLAY, sim);
        assert_eq!(display.get(5).unwrap(), 42);
        assert_eq!(display.set(5, 2024).unwrap(), 2024);
        assert_eq!(display.get(5).unwrap(), 2024);
    }

    #[test]
    fn unknown_field_sends_nothing() {
        let display = sim_device(NetworkId::Display, DISPLAY, Simulator::new());
        assert!(matches!(
            display.get_field("EAR"),
            Err(Error::UnknownRegister { name }) if name == "EAR"
        ));
        assert!(requested(&display).is_empty());
    }

    #[test]
    fn invoke_resolves_accessors() {
        let clamp = sim_device(NetworkId::Clamp, CLAMP, Simulator::new());
        assert_eq!(clamp.invoke("set_txpower", Some(7)).unwrap(), None);
        assert_eq!(clamp.invoke("get_txpower", None).unwrap(), Some(7));
        assert!(matches!(
            clamp.invoke("set_txpower", None),
            Err(Error::MissingValue { .. })
        ));
        assert!(matches!(
            clamp.invoke("get_configured", None),
            Err(Error::UnknownAccessor { accessor }) if accessor == "get_configured"
        ));
    }

    #[test]
    fn devices_share_one_client() {
        let shared = Client::new(Simulator::new()).into_shared();
        let clamp = Device::shared(shared.clone(), NetworkId::Clamp, CLAMP);
        let display = Device::shared(shared, NetworkId::Display, DISPLAY);

        clamp.set_field("version", 3).unwrap();
        display.set_field("version", 9).unwrap();
        assert_eq!(clamp.get_field("version").unwrap(), 3);
        assert_eq!(display.get_field("version").unwrap(), 9);
    }

    #[test]
    fn silent_device_times_out() {
        let clamp = sim_device(NetworkId::Clamp, CLAMP, Simulator::new());
        with_sim(&clamp, |sim| sim.inject(Fault::Silent));
        assert!(clamp.get_field("power").unwrap_err().is_timeout());
    }

    #[test]
    fn bulk_reset_and_network_list_use_device_network() {
        let mut sim = Simulator::new();
        sim.set_bulk(NetworkId::Display, StreamType::EnergyHighRes, 1, vec![5, 6]);
        sim.set_network_list(vec![1, 2]);
        let display = sim_device(NetworkId::Display, DISPLAY, sim);

        let bulk = display.get_bulk_data(StreamType::EnergyHighRes, 0, 1).unwrap();
        assert_eq!((bulk.count, bulk.data.as_ref()), (1, &[5u8, 6][..]));
        assert_eq!(display.get_network_list().unwrap().as_ref(), &[1, 0, 2, 0]);
        display.reset().unwrap();

        with_sim(&display, |sim| {
            assert_eq!(sim.reset_count(), 1);
            assert!(sim
                .requests()
                .iter()
                .all(|r| r.header.network_id == NetworkId::Display.code()));
        });
    }
}
