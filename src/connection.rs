//! Connection
//!
//! One client connection: a transport, the shared send/receive buffer with
//! its reply decoder, the negotiated server version and the last error.
//!
//! ## Request Cycle
//! 1. Render the command into the shared buffer (grow and render again if it
//!    did not fit)
//! 2. Send the rendered bytes; a short send is a timeout
//! 3. Decode exactly one reply of the expected shape
//!
//! ## Lifetime of Replies
//! A [`Reply`] borrows the connection's buffer. The next call that takes
//! `&mut self` overwrites the buffer, so the borrow checker ends every reply
//! before the next request can start.
//!
//! ## Failure Policy
//! A server error reply leaves the connection usable. Any other failure
//! (timeout, socket error, malformed reply, allocation failure) leaves the
//! stream in an unknown state: the connection is marked broken and every
//! later request fails with `ClientError::Broken` until the caller
//! reconnects.

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::info::ServerVersion;
use crate::network::{TcpTransport, Transport};
use crate::protocol::{Command, Reply, ReplyDecoder, ReplyKind};

/// A client connection over transport `T`
pub struct Connection<T: Transport = TcpTransport> {
    /// Byte transport (socket)
    transport: T,

    /// Shared send/receive buffer, multibulk store and last reply
    decoder: ReplyDecoder,

    /// Bound for each send and receive
    timeout: Duration,

    /// Version reported by the server during the handshake
    version: ServerVersion,

    /// Text of the last failure (server error line or client-side error)
    last_error: Option<String>,

    /// Set once the stream state is unknown
    broken: bool,
}

impl Connection<TcpTransport> {
    /// Connect over TCP and perform the version handshake.
    ///
    /// On failure nothing is left behind: the socket is closed before the
    /// error is returned.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let host = config.effective_host();
        let port = config.effective_port();
        tracing::debug!(
            "connecting to {}:{} (timeout {} ms)",
            host,
            port,
            config.timeout_ms
        );

        let transport = TcpTransport::connect(host, port, config.timeout())?;
        let mut conn = Connection::with_transport(transport, config.timeout_ms);

        match conn.handshake() {
            Ok(version) => {
                tracing::debug!("connected to {}:{}, server version {}", host, port, version);
                Ok(conn)
            }
            Err(e) => {
                tracing::warn!("handshake with {}:{} failed: {}", host, port, e);
                Err(e)
            }
        }
    }

    /// Connect with explicit parameters; `None` host and port 0 select the
    /// defaults (`127.0.0.1:6379`)
    pub fn connect_to(host: Option<&str>, port: u16, timeout_ms: u64) -> Result<Self> {
        let config = ClientConfig::builder()
            .host(host.unwrap_or_default())
            .port(port)
            .timeout_ms(timeout_ms)
            .build();
        Self::connect(&config)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.transport.peer_addr()
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an established transport. No handshake is performed; call
    /// [`Connection::handshake`] to negotiate the server version.
    pub fn with_transport(transport: T, timeout_ms: u64) -> Self {
        Self {
            transport,
            decoder: ReplyDecoder::new(),
            timeout: Duration::from_millis(timeout_ms),
            version: ServerVersion::default(),
            last_error: None,
            broken: false,
        }
    }

    /// Ask the server for its info report and record its version.
    ///
    /// A report without a parseable `redis_version` field is a handshake
    /// failure.
    pub fn handshake(&mut self) -> Result<ServerVersion> {
        let reply = self.send_and_receive(ReplyKind::Bulk, &Command::new("INFO"))?;
        let report = reply.as_bulk().flatten().unwrap_or_default();

        let version = ServerVersion::from_info(report).ok_or_else(|| {
            ClientError::Handshake("no usable redis_version field in INFO reply".to_string())
        })?;

        self.version = version;
        Ok(version)
    }

    /// Version negotiated by the handshake (`0.0.0` before it ran)
    pub fn server_version(&self) -> ServerVersion {
        self.version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the bound used for every later send and receive
    pub fn set_timeout(&mut self, timeout_ms: u64) {
        self.timeout = Duration::from_millis(timeout_ms);
    }

    /// Text of the last failure, if the last request failed. For a server
    /// error reply this is the server's message.
    pub fn last_error_text(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The last decoded reply, including a server error reply
    pub fn last_reply(&self) -> Option<Reply<'_>> {
        self.decoder.last_reply()
    }

    /// Returns true once a failure has left the stream in an unknown state
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the connection and hand back the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Close the connection, releasing the socket and all buffers
    pub fn close(self) {
        tracing::trace!("closing connection");
    }

    /// Send one command and decode one reply of the `expected` shape.
    ///
    /// A `-` reply from the server is returned as `ClientError::Server` and
    /// its text is kept for [`Connection::last_error_text`].
    pub fn send_and_receive(
        &mut self,
        expected: ReplyKind,
        command: &Command<'_>,
    ) -> Result<Reply<'_>> {
        if self.broken {
            self.last_error = Some(ClientError::Broken.to_string());
            return Err(ClientError::Broken);
        }
        self.last_error = None;

        match self.exchange(expected, command) {
            Ok(()) => {}
            Err(ClientError::Server(message)) => {
                tracing::debug!("server rejected {}: {}", command, message);
                self.last_error = Some(message.clone());
                return Err(ClientError::Server(message));
            }
            Err(e) => {
                tracing::warn!("request {} failed: {}", command, e);
                self.last_error = Some(e.to_string());
                self.broken = true;
                return Err(e);
            }
        }

        self.decoder
            .last_reply()
            .ok_or_else(|| ClientError::protocol("no reply decoded"))
    }

    fn exchange(&mut self, expected: ReplyKind, command: &Command<'_>) -> Result<()> {
        self.decoder.invalidate();

        let buffer = self.decoder.buffer_mut();
        let mut len = command.render(buffer.storage_mut());
        if len > buffer.capacity() {
            tracing::trace!("request of {} bytes does not fit, growing buffer", len);
            buffer.grow(len - buffer.capacity())?;
            len = command.render(buffer.storage_mut());
        }
        buffer.set_filled(len);

        tracing::trace!("sending {} ({} bytes)", command, len);
        let sent = self.transport.send(buffer.filled(), self.timeout)?;
        if sent != len {
            return Err(ClientError::Timeout);
        }

        self.decoder.receive(&mut self.transport, self.timeout, expected)
    }
}
