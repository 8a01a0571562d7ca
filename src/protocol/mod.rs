//! Protocol Module
//!
//! The client side of the line/bulk/multibulk wire protocol.
//!
//! ## Components (leaves first)
//! - [`GrowableBuffer`]: byte arena shared by request rendering and reply
//!   receiving
//! - [`LineReader`]: incremental CRLF line extraction over a transport
//! - [`MultiBulkStore`]: element offsets for array replies
//! - [`ReplyDecoder`]: prefix dispatch into one of five reply shapes
//! - [`Command`]: typed request arguments and their rendering
//!
//! ## Reply Prefixes
//! - `-`: error line
//! - `+`: status line
//! - `:`: integer
//! - `$`: bulk value (length `-1` is nil)
//! - `*`: array of bulk values (count `-1` is empty)

mod buffer;
mod command;
mod decoder;
mod line;
mod multibulk;
mod reply;

pub use buffer::{GrowableBuffer, BUFFER_INCREMENT};
pub use command::{Arg, Command};
pub use decoder::{ReplyDecoder, MAX_BULK_LEN, MAX_MULTIBULK_LEN, MULTIBULK_PRERESERVE};
pub use line::{Line, LineReader};
pub use multibulk::{MultiBulkStore, Span, MULTIBULK_INCREMENT};
pub use reply::{MultiBulkView, OwnedReply, Reply, ReplyKind};

pub(crate) use decoder::parse_integer;
