//! Line reader
//!
//! Pulls bytes from the transport into the growable buffer until a CRLF
//! terminator shows up, then hands back an offset-based view of the line.

use std::time::Duration;

use memchr::memchr;

use super::buffer::GrowableBuffer;
use crate::error::Result;
use crate::network::Transport;

/// Offset-based view of one line inside the buffer (CRLF excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Absolute offset of the first byte
    pub start: usize,

    /// Length without the terminator
    pub len: usize,
}

impl Line {
    /// Offset one past the last content byte
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Incremental CRLF line extraction over a buffer and a transport
pub struct LineReader<'a, T: Transport + ?Sized> {
    buffer: &'a mut GrowableBuffer,
    transport: &'a mut T,
    timeout: Duration,
}

impl<'a, T: Transport + ?Sized> LineReader<'a, T> {
    pub fn new(buffer: &'a mut GrowableBuffer, transport: &'a mut T, timeout: Duration) -> Self {
        Self {
            buffer,
            transport,
            timeout,
        }
    }

    pub fn buffer(&self) -> &GrowableBuffer {
        self.buffer
    }

    /// Content bytes of a line previously returned by this reader
    pub fn bytes(&self, line: Line) -> &[u8] {
        self.buffer.slice(line.start, line.len)
    }

    /// Read the next line, looking for CRLF no earlier than `start` bytes
    /// past the read cursor.
    ///
    /// The line always begins at the cursor; `start` only moves the search
    /// forward, so a length-prefixed payload may itself contain CRLF.
    ///
    /// Returns `Ok(None)` when the peer closed the stream first.
    pub fn read_line(&mut self, start: usize) -> Result<Option<Line>> {
        let from = self.buffer.cursor() + start;
        let mut scan_from = from;

        loop {
            // Bytes that must still arrive before a CRLF could sit at `from`.
            let more = (from + 2).saturating_sub(self.buffer.len());

            if more == 0 {
                if let Some(nl) = find_crlf(self.buffer.filled(), scan_from) {
                    let line = Line {
                        start: self.buffer.cursor(),
                        len: nl - self.buffer.cursor(),
                    };
                    self.buffer.consume_to(nl + 2);
                    return Ok(Some(line));
                }
                // A trailing '\r' may pair with the next chunk's '\n'.
                scan_from = self.buffer.len().saturating_sub(1).max(from);
            }

            let avail = self.buffer.headroom();
            if avail < self.buffer.low_water_mark() || avail < more {
                tracing::trace!(
                    "buffer headroom low ({} bytes, need {}), growing",
                    avail,
                    more
                );
                self.buffer.grow(more.max(1))?;
            }

            let n = self
                .transport
                .receive(self.buffer.spare_mut(), self.timeout)?;
            if n == 0 {
                tracing::debug!("peer closed the stream before a complete line");
                return Ok(None);
            }
            self.buffer.commit(n);
            tracing::trace!("received {} bytes, buffer len {}", n, self.buffer.len());
        }
    }
}

/// Offset of the '\r' of the first CRLF in `data[from..]`
fn find_crlf(data: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < data.len() {
        let cr = pos + memchr(b'\r', &data[pos..])?;
        if data.get(cr + 1) == Some(&b'\n') {
            return Some(cr);
        }
        pos = cr + 1;
    }
    None
}
