//! In-memory clamp/display pair speaking the transaction protocol.
//!
//! The simulator implements [`ReportTransport`], so a [`Client`] can drive it
//! exactly like a real device. It reassembles request reports, answers from
//! an in-memory register file and queues the response reports for reading.
//! Faults can be injected per request to exercise client error paths.
//!
//! [`Client`]: crate::Client

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use onzo_frame::{decode_report, split_message, REPORT_SIZE};
use onzo_transport::{ReportTransport, Result, TransportError};
use tracing::trace;

use crate::header::{Header, HEADER_SIZE};
use crate::message::{NetworkId, RequestType, ResponseType, StreamType};

/// Misbehavior applied to the response of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with the `ERROR` message type. The request has no effect.
    Error,
    /// Answer with a different transaction id.
    WrongTransaction,
    /// Answer with `END_OF_TRANSFER` instead of the request type.
    WrongType,
    /// Answer with a message shorter than a header.
    Truncated,
    /// Send no answer at all.
    Silent,
}

/// A request as seen by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub header: Header,
    pub payload: Vec<u8>,
}

/// Simulated device pair. Registers that were never written read as zero.
#[derive(Debug, Default)]
pub struct Simulator {
    registers: HashMap<(u16, u8), u16>,
    bulk: HashMap<(u16, u8), (u16, Vec<u8>)>,
    networks: Vec<u16>,
    faults: HashMap<usize, Fault>,
    requests: Vec<RecordedRequest>,
    resets: usize,
    incoming: BytesMut,
    outgoing: VecDeque<[u8; REPORT_SIZE]>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload one register.
    pub fn with_register(mut self, network: NetworkId, address: u8, value: u16) -> Self {
        self.set(network, address, value);
        self
    }

    pub fn set(&mut self, network: NetworkId, address: u8, value: u16) {
        self.registers.insert((network.code(), address), value);
    }

    pub fn get(&self, network: NetworkId, address: u8) -> u16 {
        self.registers
            .get(&(network.code(), address))
            .copied()
            .unwrap_or(0)
    }

    /// Bulk data returned for one stream.
    pub fn set_bulk(&mut self, network: NetworkId, stream: StreamType, count: u16, data: Vec<u8>) {
        self.bulk.insert((network.code(), stream.code()), (count, data));
    }

    /// Network ids returned by a network list request.
    pub fn set_network_list(&mut self, networks: Vec<u16>) {
        self.networks = networks;
    }

    /// Apply `fault` to the next request.
    pub fn inject(&mut self, fault: Fault) {
        self.faults.insert(self.requests.len(), fault);
    }

    /// Apply `fault` to the request with 0-based index `nth`, counted from
    /// the first request this simulator ever handled.
    pub fn fail_on(&mut self, nth: usize, fault: Fault) {
        self.faults.insert(nth, fault);
    }

    /// All requests handled so far, in arrival order.
    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    /// Number of reset commands received.
    pub fn reset_count(&self) -> usize {
        self.resets
    }

    fn handle(&mut self, message: &[u8]) {
        let Ok(header) = Header::decode(message) else {
            trace!(len = message.len(), "simulator dropped short request");
            return;
        };
        let payload = &message[HEADER_SIZE..];
        let index = self.requests.len();
        self.requests.push(RecordedRequest {
            header,
            payload: payload.to_vec(),
        });

        let mut reply = header;
        let mut body = BytesMut::new();
        match self.faults.remove(&index) {
            Some(Fault::Silent) => return,
            Some(Fault::Truncated) => {
                self.queue(&message[..HEADER_SIZE / 2]);
                return;
            }
            Some(Fault::Error) => reply.message_type = ResponseType::Error.code(),
            Some(fault) => {
                self.answer(header, payload, &mut reply, &mut body);
                match fault {
                    Fault::WrongTransaction => {
                        reply.transaction_id = reply.transaction_id.wrapping_add(1)
                    }
                    _ => reply.message_type = ResponseType::EndOfTransfer.code(),
                }
            }
            None => self.answer(header, payload, &mut reply, &mut body),
        }

        let mut out = BytesMut::with_capacity(HEADER_SIZE + body.len());
        reply.encode(&mut out);
        out.extend_from_slice(&body);
        self.queue(&out);
    }

    fn answer(&mut self, header: Header, payload: &[u8], reply: &mut Header, body: &mut BytesMut) {
        let network = header.network_id;
        let register = header.register_id;
        match header.message_type {
            t if t == RequestType::GetRegister.code() => {
                let value = self.registers.get(&(network, register)).copied().unwrap_or(0);
                body.put_u16_le(value);
            }
            t if t == RequestType::SetRegister.code() && payload.len() == 2 => {
                let value = u16::from_le_bytes([payload[0], payload[1]]);
                self.registers.insert((network, register), value);
                body.put_u16_le(value);
            }
            t if t == RequestType::CmdReset.code() => self.resets += 1,
            t if t == RequestType::GetBulkData.code() => {
                let (count, data) = self
                    .bulk
                    .get(&(network, register))
                    .cloned()
                    .unwrap_or_default();
                body.put_u16_le(count);
                body.extend_from_slice(&data);
            }
            t if t == RequestType::GetNetworkList.code() => {
                body.put_u16_le(self.networks.len() as u16);
                for id in &self.networks {
                    body.put_u16_le(*id);
                }
            }
            _ => reply.message_type = ResponseType::Error.code(),
        }
    }

    fn queue(&mut self, message: &[u8]) {
        self.outgoing.extend(split_message(message));
    }
}

impl ReportTransport for Simulator {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<usize> {
        let decoded =
            decode_report(report).map_err(|e| TransportError::Device(e.to_string()))?;
        self.incoming.extend_from_slice(decoded.payload);
        if decoded.last {
            let message = self.incoming.split();
            self.handle(&message);
        }
        Ok(REPORT_SIZE)
    }

    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE], _timeout: Duration) -> Result<usize> {
        match self.outgoing.pop_front() {
            Some(report) => {
                *buf = report;
                Ok(REPORT_SIZE)
            }
            None => Ok(0),
        }
    }

    fn transport_name(&self) -> &'static str {
        "simulator"
    }
}
