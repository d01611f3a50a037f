use std::time::Duration;

use bytes::{Bytes, BytesMut};
use onzo_transport::{ReportTransport, TransportError, REPORT_SIZE};
use tracing::trace;

use crate::codec::{decode_report, split_message};
use crate::error::{FrameError, Result};

/// Default per-report read timeout: 5 seconds.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default maximum reassembled message size: 64 KiB.
pub const DEFAULT_MAX_MESSAGE: usize = 64 * 1024;

/// Configuration for the framer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Timeout for each report read, not for the whole message.
    pub read_timeout: Duration,
    /// Maximum message size in bytes, in either direction.
    pub max_message_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE,
        }
    }
}

/// Sends and receives whole messages over a report transport.
///
/// Synchronous and blocking. Exactly one message is in flight at a time;
/// there is no pipelining.
pub struct Framer<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: ReportTransport> Framer<T> {
    /// Create a framer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a framer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(REPORT_SIZE * 4),
            config,
        }
    }

    /// Split `message` into reports and write them in order (blocking).
    pub fn send(&mut self, message: &[u8]) -> Result<()> {
        if message.len() > self.config.max_message_size {
            return Err(FrameError::MessageTooLarge {
                size: message.len(),
                max: self.config.max_message_size,
            });
        }

        for (index, report) in split_message(message).enumerate() {
            let written = self.inner.write_report(&report)?;
            if written != REPORT_SIZE {
                return Err(TransportError::ShortWrite {
                    written,
                    expected: REPORT_SIZE,
                }
                .into());
            }
            trace!(index, flag = report[0], len = report[1], "report sent");
        }
        Ok(())
    }

    /// Read reports until the final one and return the reassembled message.
    pub fn receive(&mut self) -> Result<Bytes> {
        self.receive_with_timeout(self.config.read_timeout)
    }

    /// Like [`Framer::receive`], with an explicit per-report timeout.
    pub fn receive_with_timeout(&mut self, timeout: Duration) -> Result<Bytes> {
        self.buf.clear();
        let mut report = [0u8; REPORT_SIZE];

        loop {
            let read = self.inner.read_report(&mut report, timeout)?;
            if read == 0 {
                return Err(FrameError::Timeout(timeout));
            }
            if read != REPORT_SIZE {
                return Err(TransportError::ShortRead {
                    read,
                    expected: REPORT_SIZE,
                }
                .into());
            }

            let decoded = decode_report(&report)?;
            let size = self.buf.len() + decoded.payload.len();
            if size > self.config.max_message_size {
                return Err(FrameError::MessageTooLarge {
                    size,
                    max: self.config.max_message_size,
                });
            }
            self.buf.extend_from_slice(decoded.payload);
            trace!(last = decoded.last, len = decoded.payload.len(), "report received");

            if decoded.last {
                return Ok(self.buf.split().freeze());
            }
        }
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the framer and return the inner transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the per-report read timeout.
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.config.read_timeout = timeout;
    }

    /// Current framer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: ReportTransport> std::fmt::Debug for Framer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framer")
            .field("transport", &self.inner.transport_name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use onzo_transport::Loopback;

    use super::*;
    use crate::codec::{encode_report, CHUNK_SIZE, FLAG_FINAL, FLAG_MORE, PADDING};

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn roundtrip_all_lengths_up_to_2000() {
        let mut framer = Framer::new(Loopback::echo());
        for len in 0..=2000 {
            let message = pattern(len);
            framer.send(&message).unwrap();
            let received = framer.receive().unwrap();
            assert_eq!(received.as_ref(), message.as_slice(), "len {len}");
            assert_eq!(framer.get_ref().pending(), 0);
        }
    }

    #[test]
    fn emitted_reports_have_valid_shape() {
        let mut framer = Framer::new(Loopback::new());
        let message = pattern(500);
        framer.send(&message).unwrap();

        let reports = framer.get_mut().take_written();
        let (last, rest) = reports.split_last().unwrap();
        for report in rest {
            assert_eq!(report.len(), REPORT_SIZE);
            assert_eq!((report[0], report[1] as usize), (FLAG_MORE, CHUNK_SIZE));
        }
        let tail = 500 % CHUNK_SIZE;
        assert_eq!((last[0], last[1] as usize), (FLAG_FINAL, tail));
        assert!(last[2 + tail..].iter().all(|&b| b == PADDING));
    }

    #[test]
    fn padding_content_never_reaches_message() {
        let mut lb = Loopback::new();
        let mut report = encode_report(b"xy", true).unwrap();
        // Garbage beyond the declared length must be ignored.
        report[10] = 0x42;
        lb.push_report(report);

        let mut framer = Framer::new(lb);
        assert_eq!(framer.receive().unwrap().as_ref(), b"xy");
    }

    #[test]
    fn receive_times_out_when_no_report_arrives() {
        let mut framer = Framer::new(Loopback::new());
        let err = framer
            .receive_with_timeout(Duration::from_millis(20))
            .unwrap_err();
        assert!(matches!(err, FrameError::Timeout(t) if t == Duration::from_millis(20)));
    }

    #[test]
    fn receive_times_out_mid_message() {
        let mut lb = Loopback::new();
        lb.push_report(encode_report(&[0u8; CHUNK_SIZE], false).unwrap());
        let mut framer = Framer::new(lb);

        assert!(matches!(framer.receive(), Err(FrameError::Timeout(_))));
    }

    #[test]
    fn short_read_is_transport_error() {
        let mut lb = Loopback::new().with_read_limit(40);
        lb.push_report(encode_report(b"abc", true).unwrap());
        let mut framer = Framer::new(lb);

        let err = framer.receive().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::ShortRead {
                read: 40,
                expected: 64
            })
        ));
    }

    #[test]
    fn oversized_declared_length_surfaces_from_receive() {
        let mut report = [PADDING; REPORT_SIZE];
        report[0] = FLAG_FINAL;
        report[1] = 63;
        let mut lb = Loopback::new();
        lb.push_report(report);
        let mut framer = Framer::new(lb);

        assert!(matches!(
            framer.receive(),
            Err(FrameError::InvalidLength { len: 63 })
        ));
    }

    #[test]
    fn short_write_is_transport_error() {
        let mut framer = Framer::new(Loopback::new().with_write_limit(63));
        let err = framer.send(b"hello").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::ShortWrite {
                written: 63,
                expected: 64
            })
        ));
    }

    #[test]
    fn oversized_send_rejected() {
        let cfg = FrameConfig {
            max_message_size: 8,
            ..FrameConfig::default()
        };
        let mut framer = Framer::with_config(Loopback::new(), cfg);
        let err = framer.send(&[0u8; 9]).unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { size: 9, max: 8 }));
        assert!(framer.get_ref().written().is_empty());
    }

    #[test]
    fn oversized_receive_rejected() {
        let cfg = FrameConfig {
            max_message_size: 100,
            ..FrameConfig::default()
        };
        let mut framer = Framer::with_config(Loopback::new(), cfg);
        // Send with a permissive framer so the wire carries 130 bytes.
        let mut sender = Framer::new(Loopback::new());
        sender.send(&pattern(130)).unwrap();
        for report in sender.get_mut().take_written() {
            framer.get_mut().push_report(report);
        }

        let err = framer.receive().unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { max: 100, .. }));
    }

    #[test]
    fn transport_errors_propagate() {
        let mut lb = Loopback::echo();
        lb.close();
        let mut framer = Framer::new(lb);
        assert!(matches!(
            framer.send(b"x"),
            Err(FrameError::Transport(TransportError::Closed))
        ));
        assert!(matches!(
            framer.receive(),
            Err(FrameError::Transport(TransportError::Closed))
        ));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut framer = Framer::new(Loopback::new());
        framer.set_read_timeout(Duration::from_millis(250));
        assert_eq!(framer.config().read_timeout, Duration::from_millis(250));

        let _ = framer.get_ref();
        let _ = framer.get_mut();
        let _inner = framer.into_inner();
    }
}
