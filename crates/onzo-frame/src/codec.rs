use bytes::BufMut;
use onzo_transport::REPORT_SIZE;

use crate::error::{FrameError, Result};

/// Report header: continuation flag (1) + payload length (1) = 2 bytes.
pub const REPORT_HEADER_SIZE: usize = 2;

/// Payload bytes carried by one report.
pub const CHUNK_SIZE: usize = REPORT_SIZE - REPORT_HEADER_SIZE;

/// Filler for unused payload bytes in the final report.
pub const PADDING: u8 = 0xFF;

/// Continuation flag: more reports follow.
pub const FLAG_MORE: u8 = 0;

/// Continuation flag: this is the last report of the message.
pub const FLAG_FINAL: u8 = 1;

/// A decoded physical report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report<'a> {
    /// Whether this report completes the message.
    pub last: bool,
    /// The declared payload bytes, padding excluded.
    pub payload: &'a [u8],
}

/// Encode one chunk into a wire report.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬──────────────────────────────┐
/// │ Flag (1B)│ Len (1B) │ Payload (62B, 0xFF padded)   │
/// │ 0 / 1    │ 0..=62   │                              │
/// └──────────┴──────────┴──────────────────────────────┘
/// ```
///
/// Non-final reports must carry a full [`CHUNK_SIZE`] chunk.
pub fn encode_report(chunk: &[u8], last: bool) -> Result<[u8; REPORT_SIZE]> {
    if chunk.len() > CHUNK_SIZE || (!last && chunk.len() != CHUNK_SIZE) {
        return Err(FrameError::InvalidLength { len: chunk.len() });
    }

    let mut report = [PADDING; REPORT_SIZE];
    let mut dst = &mut report[..];
    dst.put_u8(if last { FLAG_FINAL } else { FLAG_MORE });
    dst.put_u8(chunk.len() as u8);
    dst.put_slice(chunk);
    Ok(report)
}

/// Decode a wire report.
///
/// Any nonzero flag marks the final report. Bytes past the declared length
/// are padding and are never returned.
pub fn decode_report(report: &[u8; REPORT_SIZE]) -> Result<Report<'_>> {
    let len = report[1] as usize;
    if len > CHUNK_SIZE {
        return Err(FrameError::InvalidLength { len });
    }

    Ok(Report {
        last: report[0] != FLAG_MORE,
        payload: &report[REPORT_HEADER_SIZE..REPORT_HEADER_SIZE + len],
    })
}

/// Split a message into wire reports.
pub fn split_message(message: &[u8]) -> Reports<'_> {
    Reports {
        remaining: message,
        done: false,
    }
}

/// Iterator over the reports of one message, in send order.
///
/// An empty message yields a single final report with length 0.
#[derive(Debug, Clone)]
pub struct Reports<'a> {
    remaining: &'a [u8],
    done: bool,
}

impl Iterator for Reports<'_> {
    type Item = [u8; REPORT_SIZE];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let last = self.remaining.len() <= CHUNK_SIZE;
        let take = self.remaining.len().min(CHUNK_SIZE);
        let (chunk, rest) = self.remaining.split_at(take);
        self.remaining = rest;
        self.done = last;

        encode_report(chunk, last).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.done {
            0
        } else {
            self.remaining.len().div_ceil(CHUNK_SIZE).max(1)
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Reports<'_> {}
