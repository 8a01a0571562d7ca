//! Multibulk store
//!
//! Per-element bookkeeping for array replies. Elements are recorded as
//! offsets into the receive buffer while the reply is still arriving and only
//! resolved to slices once the buffer has stopped growing.

use crate::error::{ClientError, Result};

/// Growth step in entries
pub const MULTIBULK_INCREMENT: usize = 256;

/// Offset and length of one element inside the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

/// Growable table of `Some(span)` (element present) or `None` (nil bulk)
#[derive(Debug)]
pub struct MultiBulkStore {
    entries: Vec<Option<Span>>,
    len: usize,
}

impl MultiBulkStore {
    /// Create a store with one increment of capacity
    pub fn new() -> Self {
        Self {
            entries: vec![None; MULTIBULK_INCREMENT],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Populated entries
    pub fn entries(&self) -> &[Option<Span>] {
        &self.entries[..self.len]
    }

    /// Drop all populated entries; capacity is kept
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Make room for `count` entries, growing in whole increments
    pub fn reserve(&mut self, count: usize) -> Result<()> {
        if count <= self.entries.len() {
            return Ok(());
        }

        let missing = count - self.entries.len();
        let add = missing.div_ceil(MULTIBULK_INCREMENT) * MULTIBULK_INCREMENT;
        self.entries
            .try_reserve_exact(add)
            .map_err(|_| ClientError::OutOfMemory { requested: add })?;
        let total = self.entries.len() + add;
        self.entries.resize(total, None);

        tracing::trace!("multibulk store grown to {} entries", total);
        Ok(())
    }

    /// Append one element record
    pub fn push(&mut self, entry: Option<Span>) -> Result<()> {
        self.reserve(self.len + 1)?;
        self.entries[self.len] = entry;
        self.len += 1;
        Ok(())
    }
}

impl Default for MultiBulkStore {
    fn default() -> Self {
        Self::new()
    }
}
