//! # kvline
//!
//! A synchronous client engine for the line/bulk/multibulk key-value
//! protocol:
//! - Timeout-bounded connect, send and receive
//! - A growable receive buffer with offset-based (relocation-proof) views
//! - Incremental CRLF line extraction across arbitrary chunk boundaries
//! - Typed decoding of error, status, integer, bulk and multibulk replies
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Connection                             │
//! │        send_and_receive(expected kind, command)              │
//! └─────────────┬───────────────────────────────┬───────────────┘
//!               │ render + send                 │ decode
//!               ▼                               ▼
//!   ┌──────────────────────┐        ┌──────────────────────┐
//!   │      Transport       │◄───────│     ReplyDecoder     │
//!   │  (TCP, timeouts)     │ recv   │  (prefix dispatch)   │
//!   └──────────────────────┘        └──────────┬───────────┘
//!                                              │
//!                              ┌───────────────┴──────────────┐
//!                              ▼                              ▼
//!                      ┌──────────────┐              ┌────────────────┐
//!                      │  LineReader  │              │ MultiBulkStore │
//!                      └──────┬───────┘              └────────────────┘
//!                             ▼
//!                      ┌──────────────┐
//!                      │GrowableBuffer│
//!                      └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kvline::{ClientConfig, Connection};
//!
//! let config = ClientConfig::builder().host("localhost").timeout_ms(2000).build();
//! let mut conn = Connection::connect(&config)?;
//! conn.ping()?;
//! conn.sadd(b"fruits", b"banana")?;
//! conn.close();
//! # Ok::<(), kvline::ClientError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod info;
pub mod connection;
mod commands;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, Result};
pub use config::ClientConfig;
pub use connection::Connection;
pub use info::{ServerInfo, ServerRole, ServerVersion};
pub use network::{TcpTransport, Transport};
pub use protocol::{Arg, Command, OwnedReply, Reply, ReplyKind};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
