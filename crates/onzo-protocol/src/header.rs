use bytes::{Buf, BufMut};

use crate::error::ProtocolError;
use crate::message::{NetworkId, RequestType};

/// Header size: reserved (2) + reserved (8) + transaction (2) + network (2)
/// + type (1) + register (1) = 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Message header shared by requests and responses.
///
/// Wire format (little-endian):
/// ```text
/// ┌────────┬────────┬─────────┬─────────┬──────┬──────────┐
/// │ Rsvd   │ Rsvd   │ Trans.  │ Network │ Type │ Register │
/// │ (2B)   │ (8B)   │ id (2B) │ id (2B) │ (1B) │ id (1B)  │
/// └────────┴────────┴─────────┴─────────┴──────┴──────────┘
/// ```
///
/// The reserved fields are zero on requests and echoed on responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub reserved0: u16,
    pub reserved1: u64,
    pub transaction_id: u16,
    pub network_id: u16,
    pub message_type: u8,
    pub register_id: u8,
}

impl Header {
    /// Build a request header with zeroed reserved fields.
    pub fn request(
        transaction_id: u16,
        network: NetworkId,
        request_type: RequestType,
        register_id: u8,
    ) -> Self {
        Self {
            reserved0: 0,
            reserved1: 0,
            transaction_id,
            network_id: network.code(),
            message_type: request_type.code(),
            register_id,
        }
    }

    /// Append the wire encoding of this header to `dst`.
    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        dst.put_u16_le(self.reserved0);
        dst.put_u64_le(self.reserved1);
        dst.put_u16_le(self.transaction_id);
        dst.put_u16_le(self.network_id);
        dst.put_u8(self.message_type);
        dst.put_u8(self.register_id);
    }

    /// Decode a header from the start of `src`.
    pub fn decode(mut src: &[u8]) -> Result<Self, ProtocolError> {
        if src.len() < HEADER_SIZE {
            return Err(ProtocolError::Truncated { len: src.len() });
        }
        Ok(Self {
            reserved0: src.get_u16_le(),
            reserved1: src.get_u64_le(),
            transaction_id: src.get_u16_le(),
            network_id: src.get_u16_le(),
            message_type: src.get_u8(),
            register_id: src.get_u8(),
        })
    }
}
