//! Network Module
//!
//! Transport abstraction and the TCP implementation.
//!
//! ## Architecture
//! - The protocol layer only talks to the [`Transport`] trait
//! - [`TcpTransport`] is the production implementation
//! - Tests and benchmarks plug in scripted transports
//!
//! ## Transport Contract
//! - `send` returns the number of bytes written; fewer than requested means
//!   the bound elapsed. Hard socket failures are `ClientError::Send`.
//! - `receive` returns `Ok(0)` when the peer closed the stream,
//!   `ClientError::Timeout` when nothing arrived in time and
//!   `ClientError::Receive` on socket failure.

mod tcp;

pub use tcp::TcpTransport;

use std::time::Duration;

use crate::error::Result;

/// Byte transport underneath a connection
pub trait Transport {
    /// Send `data`, waiting at most `timeout` in total.
    ///
    /// Returns the number of bytes actually sent.
    fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize>;

    /// Receive at most `buf.len()` bytes, waiting at most `timeout` for the
    /// first byte to arrive.
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize> {
        (**self).send(data, timeout)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).receive(buf, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize> {
        (**self).send(data, timeout)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).receive(buf, timeout)
    }
}
