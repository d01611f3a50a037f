use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use onzo_frame::{FrameConfig, Framer};
use onzo_transport::ReportTransport;
use tracing::{debug, warn};

use crate::error::{ClientError, ProtocolError, Result};
use crate::header::{Header, HEADER_SIZE};
use crate::message::{NetworkId, RequestType, ResponseType, StreamType};
use crate::txid::{RandomIds, TransactionIds};

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub frame: FrameConfig,
}

/// One client shared by several devices on the same connection.
///
/// Hold the lock for a whole request so two requests never interleave their
/// reports on the wire.
pub type SharedClient<T> = Arc<Mutex<Client<T>>>;

/// Lock a shared client, mapping a poisoned lock to [`ClientError::LockPoisoned`].
pub fn lock_shared<T>(shared: &SharedClient<T>) -> Result<MutexGuard<'_, Client<T>>> {
    shared.lock().map_err(|_| ClientError::LockPoisoned)
}

/// Result of a bulk data request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkData {
    /// Block count reported by the device.
    pub count: u16,
    /// Raw block bytes following the count.
    pub data: Bytes,
}

/// Transaction client over a report transport.
///
/// Every call is one complete request/response exchange. The client keeps
/// no state between calls beyond the open transport and the id source.
pub struct Client<T> {
    framer: Framer<T>,
    ids: Box<dyn TransactionIds>,
    buf: BytesMut,
}

impl<T: ReportTransport> Client<T> {
    /// Create a client with default configuration and random transaction ids.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            framer: Framer::with_config(transport, config.frame),
            ids: Box::new(RandomIds::new()),
            buf: BytesMut::with_capacity(HEADER_SIZE + 8),
        }
    }

    /// Replace the transaction id source.
    pub fn with_transaction_ids(mut self, ids: impl TransactionIds + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Send one request and decode the matching response payload.
    ///
    /// Checks run in order: the `ERROR` response type, then the transaction
    /// id, then the response type. `decode` only sees payloads that passed
    /// all three.
    pub fn request<R>(
        &mut self,
        network: NetworkId,
        request_type: RequestType,
        register_id: u8,
        payload: &[u8],
        decode: impl FnOnce(Bytes) -> std::result::Result<R, ProtocolError>,
    ) -> Result<R> {
        let transaction_id = self.ids.next_id();
        let header = Header::request(transaction_id, network, request_type, register_id);

        self.buf.clear();
        header.encode(&mut self.buf);
        self.buf.extend_from_slice(payload);
        debug!(
            transaction_id,
            %network,
            %request_type,
            register_id,
            payload_len = payload.len(),
            "sending request"
        );
        self.framer.send(&self.buf)?;

        let message = self.framer.receive()?;
        let response = Header::decode(&message)?;
        let body = message.slice(HEADER_SIZE..);
        debug!(
            transaction_id = response.transaction_id,
            message_type = response.message_type,
            register_id = response.register_id,
            payload_len = body.len(),
            "received response"
        );

        if response.message_type == ResponseType::Error.code() {
            return Err(ClientError::Device { request_type });
        }
        if response.transaction_id != transaction_id {
            return Err(ProtocolError::IdMismatch {
                expected: transaction_id,
                actual: response.transaction_id,
            }
            .into());
        }
        let response_type = ResponseType::try_from(response.message_type)?;
        if !response_type.answers(request_type) {
            return Err(ProtocolError::TypeMismatch {
                expected: request_type,
                actual: response_type,
            }
            .into());
        }
        if response.network_id != network.code() {
            warn!(
                expected = network.code(),
                actual = response.network_id,
                "response network id differs from request"
            );
        }

        Ok(decode(body)?)
    }

    /// Read one 16-bit register.
    pub fn get_register(&mut self, network: NetworkId, address: u16) -> Result<u16> {
        let register_id = register_id(address)?;
        self.request(network, RequestType::GetRegister, register_id, &[], decode_u16)
    }

    /// Write one 16-bit register and return the value the device acknowledged.
    pub fn set_register(&mut self, network: NetworkId, address: u16, value: u16) -> Result<u16> {
        let register_id = register_id(address)?;
        self.request(
            network,
            RequestType::SetRegister,
            register_id,
            &value.to_le_bytes(),
            decode_u16,
        )
    }

    /// Reset the device. The response payload is ignored.
    pub fn reset(&mut self, network: NetworkId) -> Result<()> {
        self.request(network, RequestType::CmdReset, 0, &[], |_| Ok(()))
    }

    /// Fetch bulk data blocks of one stream.
    pub fn get_bulk_data(
        &mut self,
        network: NetworkId,
        stream: StreamType,
        block_id: u16,
        max_blocks: u16,
    ) -> Result<BulkData> {
        let mut payload = [0u8; 4];
        let mut dst = &mut payload[..];
        dst.put_u16_le(block_id);
        dst.put_u16_le(max_blocks);
        self.request(
            network,
            RequestType::GetBulkData,
            stream.code(),
            &payload,
            decode_bulk,
        )
    }

    /// List the networks known to the device, as raw bytes.
    pub fn get_network_list(&mut self, network: NetworkId) -> Result<Bytes> {
        self.request(
            network,
            RequestType::GetNetworkList,
            0,
            &[],
            decode_network_list,
        )
    }

    /// Wrap this client for sharing between devices.
    pub fn into_shared(self) -> SharedClient<T> {
        Arc::new(Mutex::new(self))
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.framer.get_ref()
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        self.framer.get_mut()
    }

    /// Consume the client and return the inner transport.
    pub fn into_inner(self) -> T {
        self.framer.into_inner()
    }
}

impl<T: ReportTransport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("framer", &self.framer)
            .finish_non_exhaustive()
    }
}

fn register_id(address: u16) -> Result<u8> {
    u8::try_from(address).map_err(|_| ClientError::RegisterOutOfRange(address))
}

/// Decode a little-endian 16-bit value. The payload must be exactly 2 bytes.
pub fn decode_u16(payload: Bytes) -> std::result::Result<u16, ProtocolError> {
    if payload.len() != 2 {
        return Err(ProtocolError::PayloadLength {
            expected: 2,
            actual: payload.len(),
        });
    }
    Ok(u16::from_le_bytes([payload[0], payload[1]]))
}

/// Decode a bulk response: leading 16-bit count, then raw block bytes.
pub fn decode_bulk(mut payload: Bytes) -> std::result::Result<BulkData, ProtocolError> {
    if payload.len() < 2 {
        return Err(ProtocolError::PayloadLength {
            expected: 2,
            actual: payload.len(),
        });
    }
    let count = payload.get_u16_le();
    Ok(BulkData {
        count,
        data: payload,
    })
}

/// Decode a network list response: everything after the leading 16-bit word.
pub fn decode_network_list(payload: Bytes) -> std::result::Result<Bytes, ProtocolError> {
    if payload.len() < 2 {
        return Err(ProtocolError::PayloadLength {
            expected: 2,
            actual: payload.len(),
        });
    }
    Ok(payload.slice(2..))
}
