//! Message type codes, network ids and bulk stream types.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Request message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestType {
    GetRegister = 1,
    SetRegister = 2,
    GetBulkData = 3,
    GetNetworkList = 4,
    CmdReset = 5,
    /// Reserved. No payload encoding is known for bulk writes.
    WriteBulkData = 6,
    LdmCommand = 160,
}

impl RequestType {
    /// Wire code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Protocol name, as used in device documentation.
    pub const fn name(self) -> &'static str {
        match self {
            RequestType::GetRegister => "GET_REGISTER",
            RequestType::SetRegister => "SET_REGISTER",
            RequestType::GetBulkData => "GET_BULK_DATA",
            RequestType::GetNetworkList => "GET_NETWORK_LIST",
            RequestType::CmdReset => "CMD_RESET",
            RequestType::WriteBulkData => "WRITE_BULK_DATA",
            RequestType::LdmCommand => "LDM_COMMAND",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Response message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseType {
    GetRegister = 1,
    SetRegister = 2,
    GetBulkData = 3,
    GetNetworkList = 4,
    CmdReset = 5,
    WriteBulkData = 6,
    LdmCommand = 160,
    Error = 240,
    EndOfTransfer = 241,
}

impl ResponseType {
    /// Wire code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether this response type answers `request`.
    pub const fn answers(self, request: RequestType) -> bool {
        self.code() == request.code()
    }

    pub const fn name(self) -> &'static str {
        match self {
            ResponseType::GetRegister => "GET_REGISTER",
            ResponseType::SetRegister => "SET_REGISTER",
            ResponseType::GetBulkData => "GET_BULK_DATA",
            ResponseType::GetNetworkList => "GET_NETWORK_LIST",
            ResponseType::CmdReset => "CMD_RESET",
            ResponseType::WriteBulkData => "WRITE_BULK_DATA",
            ResponseType::LdmCommand => "LDM_COMMAND",
            ResponseType::Error => "ERROR",
            ResponseType::EndOfTransfer => "END_OF_TRANSFER",
        }
    }
}

impl TryFrom<u8> for ResponseType {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, ProtocolError> {
        Ok(match code {
            1 => ResponseType::GetRegister,
            2 => ResponseType::SetRegister,
            3 => ResponseType::GetBulkData,
            4 => ResponseType::GetNetworkList,
            5 => ResponseType::CmdReset,
            6 => ResponseType::WriteBulkData,
            160 => ResponseType::LdmCommand,
            240 => ResponseType::Error,
            241 => ResponseType::EndOfTransfer,
            other => return Err(ProtocolError::UnknownMessageType(other)),
        })
    }
}

impl From<RequestType> for ResponseType {
    fn from(request: RequestType) -> Self {
        match request {
            RequestType::GetRegister => ResponseType::GetRegister,
            RequestType::SetRegister => ResponseType::SetRegister,
            RequestType::GetBulkData => ResponseType::GetBulkData,
            RequestType::GetNetworkList => ResponseType::GetNetworkList,
            RequestType::CmdReset => ResponseType::CmdReset,
            RequestType::WriteBulkData => ResponseType::WriteBulkData,
            RequestType::LdmCommand => ResponseType::LdmCommand,
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical device selected by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NetworkId {
    Clamp = 1,
    Display = 2,
}

impl NetworkId {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn name(self) -> &'static str {
        match self {
            NetworkId::Clamp => "clamp",
            NetworkId::Display => "display",
        }
    }
}

impl TryFrom<u16> for NetworkId {
    type Error = u16;

    fn try_from(code: u16) -> Result<Self, u16> {
        match code {
            1 => Ok(NetworkId::Clamp),
            2 => Ok(NetworkId::Display),
            other => Err(other),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bulk data stream, passed as the block type of a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    EnergyHighRes,
    EnergyLowRes,
    PowerRealFine,
    PowerRealStandard,
    PowerReactiveFine,
    PowerReactiveStandard,
}

impl StreamType {
    pub const ALL: [StreamType; 6] = [
        StreamType::EnergyHighRes,
        StreamType::EnergyLowRes,
        StreamType::PowerRealFine,
        StreamType::PowerRealStandard,
        StreamType::PowerReactiveFine,
        StreamType::PowerReactiveStandard,
    ];

    /// ASCII code used as the block type.
    pub const fn code(self) -> u8 {
        match self {
            StreamType::EnergyHighRes => b'E',
            StreamType::EnergyLowRes => b'e',
            StreamType::PowerRealFine => b'P',
            StreamType::PowerRealStandard => b'p',
            StreamType::PowerReactiveFine => b'Q',
            StreamType::PowerReactiveStandard => b'q',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StreamType::EnergyHighRes => "energy-high-res",
            StreamType::EnergyLowRes => "energy-low-res",
            StreamType::PowerRealFine => "power-real-fine",
            StreamType::PowerRealStandard => "power-real-standard",
            StreamType::PowerReactiveFine => "power-reactive-fine",
            StreamType::PowerReactiveStandard => "power-reactive-standard",
        }
    }
}

impl FromStr for StreamType {
    type Err = String;

    /// Accepts either the single-letter code (case-sensitive) or the long name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamType::ALL
            .into_iter()
            .find(|t| s.as_bytes() == [t.code()] || s.eq_ignore_ascii_case(t.name()))
            .ok_or_else(|| format!("unknown stream type '{s}'"))
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
