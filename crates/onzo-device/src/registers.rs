//! Static register tables.
//!
//! Each field maps to one or more 16-bit register addresses listed least
//! significant word first.

/// One named field and the registers it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub name: &'static str,
    pub addresses: &'static [u16],
}

impl Register {
    const fn new(name: &'static str, addresses: &'static [u16]) -> Self {
        Self { name, addresses }
    }

    /// Number of 16-bit words.
    pub fn words(&self) -> usize {
        self.addresses.len()
    }

    /// Largest value the field can hold.
    pub fn max_value(&self) -> u64 {
        match self.words() {
            0 => 0,
            n if n >= 4 => u64::MAX,
            n => (1u64 << (16 * n)) - 1,
        }
    }
}

/// A device's register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    registers: &'static [Register],
}

impl RegisterMap {
    pub const fn new(registers: &'static [Register]) -> Self {
        Self { registers }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static Register> {
        self.registers.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Register> {
        self.registers.iter()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

/// Clamp register table.
pub const CLAMP: RegisterMap = RegisterMap::new(CLAMP_REGISTERS);

/// Display register table.
pub const DISPLAY: RegisterMap = RegisterMap::new(DISPLAY_REGISTERS);

const CLAMP_REGISTERS: &[Register] = &[
    Register::new("type", &[0]),
    Register::new("version", &[1]),
    Register::new("serial", &[2, 3]),
    Register::new("status", &[4]),
    Register::new("power", &[5]),
    Register::new("readinginterval", &[6]),
    Register::new("sendinginterval", &[7]),
    Register::new("timestamp", &[8, 9]),
    Register::new("voltage", &[10]),
    Register::new("calphase0", &[11]),
    Register::new("calgain0", &[12]),
    Register::new("temperature", &[13]),
    // Refreshed by the clamp roughly every 15 seconds.
    Register::new("powervars", &[14]),
    Register::new("RSSI", &[15]),
    Register::new("EAR", &[16, 17]),
    Register::new("batteryvolts", &[18]),
    Register::new("txpower", &[19]),
    Register::new("instwatt", &[23]),
    Register::new("instvar", &[24]),
    Register::new("calgain1", &[25]),
    Register::new("calgain2", &[26]),
    Register::new("txperiodlimits", &[27]),
    Register::new("calgain3", &[28]),
    Register::new("calgain4", &[29]),
];

const DISPLAY_REGISTERS: &[Register] = &[
    Register::new("min", &[1]),
    Register::new("hour", &[2]),
    Register::new("day", &[3]),
    Register::new("month", &[4]),
    Register::new("year", &[5]),
    Register::new("synched", &[33]),
    Register::new("version", &[45]),
    Register::new("hardware", &[46]),
    Register::new("configured", &[83]),
    Register::new("standingcharge", &[129, 130]),
    Register::new("unitcost", &[131, 132]),
    Register::new("EAC", &[133, 134]),
    Register::new("gridweekstart", &[176]),
    Register::new("gridweekstop", &[177]),
    Register::new("gridweekendstart", &[178]),
    Register::new("gridweekendstop", &[179]),
    Register::new("serial", &[185, 186]),
    Register::new("country", &[187]),
    Register::new("temp-offset", &[192]),
    Register::new("temp-gain", &[193]),
    Register::new("target", &[222, 223]),
    Register::new("cost0", &[224]),
    Register::new("cost1", &[225]),
    Register::new("cost2", &[226]),
    Register::new("cost3", &[227]),
    Register::new("start0", &[228]),
    Register::new("start1", &[229]),
    Register::new("start2", &[230]),
    Register::new("start3", &[231]),
];
