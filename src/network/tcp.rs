//! TCP transport
//!
//! Blocking `std::net::TcpStream` with per-operation socket timeouts.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use super::Transport;
use crate::error::{ClientError, Result};

/// Socket timeouts cannot be zero; anything shorter is raised to this
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// TCP connection to a server
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Resolve `host` (name or numeric address) and connect within `timeout`.
    ///
    /// Every resolved address is tried in order. Sockets that fail to connect
    /// or to configure are dropped before the next attempt.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| ClientError::Resolve(format!("{}:{}: {}", host, port, e)))?
            .collect();

        if addrs.is_empty() {
            return Err(ClientError::Resolve(format!(
                "{}:{}: no addresses found",
                host, port
            )));
        }

        let timeout = clamp(timeout);
        let mut last_error = None;
        for addr in addrs {
            match Self::connect_addr(addr, timeout) {
                Ok(transport) => {
                    tracing::debug!("connected to {}", addr);
                    return Ok(transport);
                }
                Err(e) => {
                    tracing::debug!("connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ClientError::Connect(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no address could be connected")
        })))
    }

    fn connect_addr(addr: SocketAddr, timeout: Duration) -> io::Result<Self> {
        // Non-blocking connect, wait for writability, then check SO_ERROR.
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        Self::configure(&stream)?;
        Ok(Self { stream, peer: addr })
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr().map_err(ClientError::Connect)?;
        Self::configure(&stream).map_err(ClientError::Connect)?;
        Ok(Self { stream, peer })
    }

    fn configure(stream: &TcpStream) -> io::Result<()> {
        // Disable Nagle's algorithm; requests are small and latency bound.
        stream.set_nodelay(true)?;
        set_keepalive(stream)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Shut down both directions of the socket
    pub fn shutdown(&self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Both)
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8], timeout: Duration) -> Result<usize> {
        let deadline = Instant::now() + clamp(timeout);
        let mut sent = 0;

        while sent < data.len() {
            // Each wait is bounded by what is left of the overall timeout.
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.stream
                .set_write_timeout(Some(clamp(remaining)))
                .map_err(ClientError::Send)?;

            match self.stream.write(&data[sent..]) {
                Ok(0) => {
                    return Err(ClientError::Send(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "socket accepted no bytes",
                    )))
                }
                Ok(n) => sent += n,
                // The loop head decides whether any of the bound is left.
                Err(e) if is_timeout(&e) || e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ClientError::Send(e)),
            }
        }

        if sent < data.len() {
            tracing::debug!(
                "send to {} timed out after {} of {} bytes",
                self.peer,
                sent,
                data.len()
            );
        }
        Ok(sent)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.stream.set_read_timeout(Some(clamp(timeout)))?;

        loop {
            match self.stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if is_timeout(&e) => {
                    tracing::debug!("receive from {} timed out", self.peer);
                    return Err(ClientError::Timeout);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ClientError::Receive(e)),
            }
        }
    }
}

fn clamp(timeout: Duration) -> Duration {
    timeout.max(MIN_TIMEOUT)
}

/// Socket timeouts surface as WouldBlock on unix and TimedOut on Windows
fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(unix)]
fn set_keepalive(stream: &TcpStream) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let yes: libc::c_int = 1;
    // SAFETY: the descriptor is owned by `stream` and open for the duration of
    // the call; the option value points to a live c_int of the given size.
    let rc = unsafe {
        libc::setsockopt(
            stream.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_KEEPALIVE,
            &yes as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_keepalive(_stream: &TcpStream) -> io::Result<()> {
    Ok(())
}
