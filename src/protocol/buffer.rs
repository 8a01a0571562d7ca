//! Growable buffer
//!
//! The single byte arena a connection uses for both rendering requests and
//! receiving replies.
//!
//! ## Layout
//! ```text
//! 0              idx                len                 size
//! ├───────────────┼──────────────────┼───────────────────┤
//! │   consumed    │   unconsumed     │     headroom      │
//! └───────────────┴──────────────────┴───────────────────┘
//! ```
//!
//! Invariant: `0 <= idx <= len <= size`. Growth is the only path that
//! reallocates; it preserves `[0, len)` and never shrinks. Callers hold
//! offsets into the arena, never references, so growth cannot invalidate
//! anything already handed out.

use crate::error::{ClientError, Result};

/// Growth step (and initial capacity) in bytes
pub const BUFFER_INCREMENT: usize = 4096;

/// Owned, growable byte arena with a fill length and a read cursor
#[derive(Debug)]
pub struct GrowableBuffer {
    /// Backing storage; `data.len()` is the capacity
    data: Vec<u8>,

    /// Bytes currently valid
    len: usize,

    /// Start of the unconsumed region
    idx: usize,
}

impl GrowableBuffer {
    /// Create a buffer with one increment of capacity
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_INCREMENT)
    }

    /// Create a buffer with an explicit initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
            idx: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read cursor (start of the unconsumed region)
    pub fn cursor(&self) -> usize {
        self.idx
    }

    /// Free space after the filled region
    pub fn headroom(&self) -> usize {
        self.data.len() - self.len
    }

    /// Low-water mark for the line reader: grow before receiving when the
    /// headroom falls below this
    pub fn low_water_mark(&self) -> usize {
        self.capacity() / 10 + 1
    }

    /// All valid bytes, `[0, len)`
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Bytes received but not yet consumed, `[idx, len)`
    pub fn unconsumed(&self) -> &[u8] {
        &self.data[self.idx..self.len]
    }

    /// Resolve an offset-based view
    ///
    /// # Panics
    /// Panics if the span lies outside the filled region.
    pub fn slice(&self, start: usize, len: usize) -> &[u8] {
        &self.data[start..start + len]
    }

    /// Writable headroom, `[len, size)`
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Whole backing storage, for rendering a request from offset 0
    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Mark `n` more bytes of headroom as filled
    pub fn commit(&mut self, n: usize) {
        assert!(n <= self.headroom(), "commit past buffer capacity");
        self.len += n;
    }

    /// Replace the filled region with the first `len` bytes of storage
    pub(crate) fn set_filled(&mut self, len: usize) {
        assert!(len <= self.capacity(), "filled length past buffer capacity");
        self.len = len;
        self.idx = 0;
    }

    /// Move the read cursor to `idx`
    pub fn consume_to(&mut self, idx: usize) {
        assert!(idx >= self.idx && idx <= self.len, "cursor out of range");
        self.idx = idx;
    }

    /// Forget all content; capacity is kept
    pub fn reset(&mut self) {
        self.len = 0;
        self.idx = 0;
    }

    /// Make sure at least `extra` bytes of headroom exist
    pub fn ensure(&mut self, extra: usize) -> Result<()> {
        if self.headroom() < extra {
            self.grow(extra)?;
        }
        Ok(())
    }

    /// Grow capacity by `extra` rounded up to whole increments (at least one).
    ///
    /// On failure the buffer is left exactly as it was.
    pub fn grow(&mut self, extra: usize) -> Result<()> {
        let steps = extra.div_ceil(BUFFER_INCREMENT).max(1);
        let add = steps
            .checked_mul(BUFFER_INCREMENT)
            .ok_or(ClientError::OutOfMemory { requested: extra })?;
        let total = self
            .data
            .len()
            .checked_add(add)
            .ok_or(ClientError::OutOfMemory { requested: add })?;

        self.data
            .try_reserve_exact(add)
            .map_err(|_| ClientError::OutOfMemory { requested: add })?;
        self.data.resize(total, 0);

        tracing::trace!(
            "buffer grown by {} x {} bytes, capacity {}",
            steps,
            BUFFER_INCREMENT,
            total
        );
        Ok(())
    }

    /// Append bytes after the filled region, growing as needed
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        let len = self.len;
        self.data[len..len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}
