//! Reply definitions
//!
//! Typed server replies. [`Reply`] borrows from the connection's receive
//! buffer and lives until the next call on that connection; [`OwnedReply`]
//! is a detached copy.

use std::fmt;

use bytes::Bytes;

use super::buffer::GrowableBuffer;
use super::multibulk::{MultiBulkStore, Span};

/// Reply shapes, keyed by their wire prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplyKind {
    Error = b'-',
    Status = b'+',
    Integer = b':',
    Bulk = b'$',
    MultiBulk = b'*',
}

impl ReplyKind {
    /// Wire prefix byte
    pub fn prefix(self) -> u8 {
        self as u8
    }

    /// Map a prefix byte back to its shape
    pub fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            b'-' => Some(ReplyKind::Error),
            b'+' => Some(ReplyKind::Status),
            b':' => Some(ReplyKind::Integer),
            b'$' => Some(ReplyKind::Bulk),
            b'*' => Some(ReplyKind::MultiBulk),
            _ => None,
        }
    }
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplyKind::Error => "error",
            ReplyKind::Status => "status",
            ReplyKind::Integer => "integer",
            ReplyKind::Bulk => "bulk",
            ReplyKind::MultiBulk => "multibulk",
        };
        f.write_str(name)
    }
}

/// A decoded reply borrowing from the connection's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    /// `-` line: request-level failure reported by the server
    Error(&'a str),

    /// `+` line
    Status(&'a str),

    /// `:` line
    Integer(i64),

    /// `$` value, `None` for the nil sentinel
    Bulk(Option<&'a [u8]>),

    /// `*` array of bulk values
    MultiBulk(MultiBulkView<'a>),
}

impl<'a> Reply<'a> {
    pub fn kind(&self) -> ReplyKind {
        match self {
            Reply::Error(_) => ReplyKind::Error,
            Reply::Status(_) => ReplyKind::Status,
            Reply::Integer(_) => ReplyKind::Integer,
            Reply::Bulk(_) => ReplyKind::Bulk,
            Reply::MultiBulk(_) => ReplyKind::MultiBulk,
        }
    }

    pub fn as_status(&self) -> Option<&'a str> {
        match *self {
            Reply::Status(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Reply::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Outer `None`: not a bulk reply. Inner `None`: nil bulk.
    pub fn as_bulk(&self) -> Option<Option<&'a [u8]>> {
        match *self {
            Reply::Bulk(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_multibulk(&self) -> Option<MultiBulkView<'a>> {
        match *self {
            Reply::MultiBulk(view) => Some(view),
            _ => None,
        }
    }

    /// Copy the reply out of the connection's buffer
    pub fn into_owned(self) -> OwnedReply {
        match self {
            Reply::Error(text) => OwnedReply::Error(text.to_string()),
            Reply::Status(text) => OwnedReply::Status(text.to_string()),
            Reply::Integer(value) => OwnedReply::Integer(value),
            Reply::Bulk(value) => OwnedReply::Bulk(value.map(Bytes::copy_from_slice)),
            Reply::MultiBulk(view) => OwnedReply::MultiBulk(
                view.iter()
                    .map(|item| item.map(Bytes::copy_from_slice))
                    .collect(),
            ),
        }
    }
}

/// Zero-copy view over the elements of an array reply
#[derive(Clone, Copy)]
pub struct MultiBulkView<'a> {
    entries: &'a [Option<Span>],
    buffer: &'a GrowableBuffer,
}

impl<'a> MultiBulkView<'a> {
    pub(crate) fn new(store: &'a MultiBulkStore, buffer: &'a GrowableBuffer) -> Self {
        Self {
            entries: store.entries(),
            buffer,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outer `None`: index out of range. Inner `None`: nil element.
    pub fn get(&self, index: usize) -> Option<Option<&'a [u8]>> {
        let buffer = self.buffer;
        self.entries
            .get(index)
            .map(|entry| entry.map(|span| buffer.slice(span.start, span.len)))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'a [u8]>> + 'a {
        let buffer = self.buffer;
        self.entries
            .iter()
            .map(move |entry| entry.map(|span| buffer.slice(span.start, span.len)))
    }

    pub fn to_vec(&self) -> Vec<Option<&'a [u8]>> {
        self.iter().collect()
    }
}

impl PartialEq for MultiBulkView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for MultiBulkView<'_> {}

impl fmt::Debug for MultiBulkView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|item| item.map(String::from_utf8_lossy)))
            .finish()
    }
}

/// A reply detached from the connection's buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedReply {
    Error(String),
    Status(String),
    Integer(i64),
    Bulk(Option<Bytes>),
    MultiBulk(Vec<Option<Bytes>>),
}

impl OwnedReply {
    pub fn kind(&self) -> ReplyKind {
        match self {
            OwnedReply::Error(_) => ReplyKind::Error,
            OwnedReply::Status(_) => ReplyKind::Status,
            OwnedReply::Integer(_) => ReplyKind::Integer,
            OwnedReply::Bulk(_) => ReplyKind::Bulk,
            OwnedReply::MultiBulk(_) => ReplyKind::MultiBulk,
        }
    }
}

/// Offset-based form of the last decoded reply, kept on the connection.
///
/// Array elements live in the multibulk store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyFrame {
    Error(Span),
    Status(Span),
    Integer(i64),
    Bulk(Option<Span>),
    MultiBulk,
}

impl ReplyFrame {
    /// Turn offsets into views once all growth for the decode is over
    pub(crate) fn resolve<'a>(
        &self,
        buffer: &'a GrowableBuffer,
        store: &'a MultiBulkStore,
    ) -> Reply<'a> {
        match *self {
            ReplyFrame::Error(span) => Reply::Error(text_at(buffer, span)),
            ReplyFrame::Status(span) => Reply::Status(text_at(buffer, span)),
            ReplyFrame::Integer(value) => Reply::Integer(value),
            ReplyFrame::Bulk(span) => {
                Reply::Bulk(span.map(|span| buffer.slice(span.start, span.len)))
            }
            ReplyFrame::MultiBulk => Reply::MultiBulk(MultiBulkView::new(store, buffer)),
        }
    }
}

// Spans of text frames were checked for UTF-8 when they were decoded.
fn text_at(buffer: &GrowableBuffer, span: Span) -> &str {
    std::str::from_utf8(buffer.slice(span.start, span.len)).unwrap_or_default()
}
