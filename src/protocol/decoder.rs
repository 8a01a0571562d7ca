//! Reply decoder
//!
//! Reads exactly one reply from the transport and interprets it according to
//! its prefix byte.
//!
//! ## Reply Grammar
//! ```text
//! error     := '-' text CRLF
//! status    := '+' text CRLF
//! integer   := ':' decimal CRLF
//! bulk      := '$' length CRLF [ length OCTET CRLF ]   ; length = -1 => nil
//! multibulk := '*' count CRLF count * bulk              ; count  = -1 => empty
//! ```

use std::time::Duration;

use super::buffer::GrowableBuffer;
use super::line::{Line, LineReader};
use super::multibulk::{MultiBulkStore, Span};
use super::reply::{Reply, ReplyFrame, ReplyKind};
use crate::error::{ClientError, Result};
use crate::network::Transport;

/// Largest bulk payload accepted (512 MiB)
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest element count accepted for an array reply
pub const MAX_MULTIBULK_LEN: i64 = 16_777_216;

/// Length value standing for "nil"
const NIL_LENGTH: i64 = -1;

/// Most multibulk entries reserved up front from an announced count; the
/// store grows past this as elements actually arrive
pub const MULTIBULK_PRERESERVE: usize = 4096;

/// Owns the receive buffer and multibulk store of one connection and decodes
/// replies into them
#[derive(Debug, Default)]
pub struct ReplyDecoder {
    buffer: GrowableBuffer,
    store: MultiBulkStore,
    frame: Option<ReplyFrame>,
}

impl ReplyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &GrowableBuffer {
        &self.buffer
    }

    /// Shared send/receive buffer; used to render requests
    pub fn buffer_mut(&mut self) -> &mut GrowableBuffer {
        &mut self.buffer
    }

    pub fn store(&self) -> &MultiBulkStore {
        &self.store
    }

    /// The reply produced by the last successful decode (including a server
    /// error reply), if the buffer has not been reused since
    pub fn last_reply(&self) -> Option<Reply<'_>> {
        self.frame
            .as_ref()
            .map(|frame| frame.resolve(&self.buffer, &self.store))
    }

    /// Forget the last reply; the next render overwrites its bytes
    pub(crate) fn invalidate(&mut self) {
        self.frame = None;
    }

    /// Decode one reply of the `expected` shape.
    ///
    /// A `-` reply is accepted for any expected shape and surfaces as
    /// `ClientError::Server`; it is still retrievable via `last_reply`.
    pub fn decode<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        timeout: Duration,
        expected: ReplyKind,
    ) -> Result<Reply<'_>> {
        self.receive(transport, timeout, expected)?;
        self.last_reply()
            .ok_or_else(|| ClientError::protocol("no reply decoded"))
    }

    /// Like [`ReplyDecoder::decode`], keeping the reply for `last_reply`
    /// instead of returning it
    pub fn receive<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        timeout: Duration,
        expected: ReplyKind,
    ) -> Result<()> {
        self.frame = None;
        self.buffer.reset();
        self.store.clear();

        let frame = self.decode_frame(transport, timeout, expected)?;
        self.frame = Some(frame);

        match frame.resolve(&self.buffer, &self.store) {
            Reply::Error(text) => Err(ClientError::Server(text.to_string())),
            _ => Ok(()),
        }
    }

    fn decode_frame<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        timeout: Duration,
        expected: ReplyKind,
    ) -> Result<ReplyFrame> {
        let mut reader = LineReader::new(&mut self.buffer, transport, timeout);

        let line = reader.read_line(0)?.ok_or_else(ClientError::closed)?;
        let prefix = match reader.bytes(line).first() {
            Some(&prefix) => prefix,
            None => return Err(ClientError::protocol("empty reply line")),
        };

        if prefix != expected.prefix() && prefix != ReplyKind::Error.prefix() {
            return Err(ClientError::protocol(format!(
                "expected {} reply, got prefix {:?}",
                expected,
                char::from(prefix)
            )));
        }

        let payload = Span {
            start: line.start + 1,
            len: line.len - 1,
        };

        match ReplyKind::from_prefix(prefix) {
            Some(ReplyKind::Error) => {
                check_text(reader.buffer(), payload)?;
                Ok(ReplyFrame::Error(payload))
            }
            Some(ReplyKind::Status) => {
                check_text(reader.buffer(), payload)?;
                Ok(ReplyFrame::Status(payload))
            }
            Some(ReplyKind::Integer) => {
                let text = reader.buffer().slice(payload.start, payload.len);
                Ok(ReplyFrame::Integer(parse_integer(text)))
            }
            Some(ReplyKind::Bulk) => {
                let text = reader.buffer().slice(payload.start, payload.len);
                let len = parse_length(text, MAX_BULK_LEN)?;
                let span = read_bulk(&mut reader, len)?;
                Ok(ReplyFrame::Bulk(span))
            }
            Some(ReplyKind::MultiBulk) => {
                let text = reader.buffer().slice(payload.start, payload.len);
                let count = parse_length(text, MAX_MULTIBULK_LEN)?;
                read_multibulk(&mut reader, &mut self.store, count)?;
                Ok(ReplyFrame::MultiBulk)
            }
            None => Err(ClientError::protocol(format!(
                "unknown reply prefix {:?}",
                char::from(prefix)
            ))),
        }
    }
}

/// Read a bulk payload of `len` bytes (`-1` = nil) following its header line
fn read_bulk<T: Transport + ?Sized>(
    reader: &mut LineReader<'_, T>,
    len: i64,
) -> Result<Option<Span>> {
    if len == NIL_LENGTH {
        return Ok(None);
    }

    let expected = len as usize;
    let line: Line = reader
        .read_line(expected)?
        .ok_or_else(|| ClientError::protocol("stream ended inside bulk payload"))?;

    if line.len != expected {
        return Err(ClientError::protocol(format!(
            "bulk payload length mismatch: announced {}, got {}",
            expected, line.len
        )));
    }

    Ok(Some(Span {
        start: line.start,
        len: line.len,
    }))
}

/// Read `count` bulk elements (`-1` = nil array) into the store
fn read_multibulk<T: Transport + ?Sized>(
    reader: &mut LineReader<'_, T>,
    store: &mut MultiBulkStore,
    count: i64,
) -> Result<()> {
    if count == NIL_LENGTH {
        return Ok(());
    }

    let count = count as usize;
    store.reserve(count.min(MULTIBULK_PRERESERVE))?;

    for index in 0..count {
        let header = reader.read_line(0)?.ok_or_else(|| {
            ClientError::protocol(format!(
                "stream ended after {} of {} multibulk elements",
                index, count
            ))
        })?;

        let bytes = reader.bytes(header);
        if bytes.first() != Some(&ReplyKind::Bulk.prefix()) {
            return Err(ClientError::protocol(format!(
                "multibulk element {} is not a bulk value",
                index
            )));
        }

        let len = parse_length(&bytes[1..], MAX_BULK_LEN)?;
        let span = read_bulk(reader, len)?;
        store.push(span)?;
    }

    Ok(())
}

fn check_text(buffer: &GrowableBuffer, span: Span) -> Result<()> {
    std::str::from_utf8(buffer.slice(span.start, span.len))
        .map(|_| ())
        .map_err(|_| ClientError::protocol("reply line is not valid UTF-8"))
}

/// Strict decimal length field: `-1` or `0..=max`
fn parse_length(text: &[u8], max: i64) -> Result<i64> {
    let value = std::str::from_utf8(text)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            ClientError::protocol(format!(
                "invalid length field {:?}",
                String::from_utf8_lossy(text)
            ))
        })?;

    if value < NIL_LENGTH || value > max {
        return Err(ClientError::protocol(format!(
            "length field out of range: {}",
            value
        )));
    }
    Ok(value)
}

/// Permissive base-10 parse for integer replies.
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit, and text without digits yields 0. Saturates on overflow.
pub(crate) fn parse_integer(text: &[u8]) -> i64 {
    let mut rest = text
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .peekable();

    let negative = match rest.peek() {
        Some(b'-') => {
            rest.next();
            true
        }
        Some(b'+') => {
            rest.next();
            false
        }
        _ => false,
    };

    rest.take_while(|b| b.is_ascii_digit()).fold(0i64, |acc, &b| {
        let digit = i64::from(b - b'0');
        if negative {
            acc.saturating_mul(10).saturating_sub(digit)
        } else {
            acc.saturating_mul(10).saturating_add(digit)
        }
    })
}
