//! Command wrappers
//!
//! Thin formatters over [`Connection::send_and_receive`]. Each wrapper builds
//! its request, names the reply shape it expects and maps the reply to a
//! plain Rust value.

use crate::connection::Connection;
use crate::error::Result;
use crate::info::ServerInfo;
use crate::network::Transport;
use crate::protocol::{Command, ReplyKind};

impl<T: Transport> Connection<T> {
    /// Check that the server answers
    pub fn ping(&mut self) -> Result<()> {
        self.send_and_receive(ReplyKind::Status, &Command::new("PING"))?;
        Ok(())
    }

    /// Authenticate with `password`
    pub fn auth(&mut self, password: &str) -> Result<()> {
        self.send_and_receive(ReplyKind::Status, &Command::new("AUTH").arg(password))?;
        Ok(())
    }

    /// Fetch and scan the server's info report.
    ///
    /// Fields the server does not report stay at their defaults.
    pub fn info(&mut self) -> Result<ServerInfo> {
        let reply = self.send_and_receive(ReplyKind::Bulk, &Command::new("INFO"))?;
        let report = reply.as_bulk().flatten().unwrap_or_default();
        Ok(ServerInfo::parse(report))
    }

    /// Switch the connection into monitor mode
    pub fn monitor(&mut self) -> Result<()> {
        self.send_and_receive(ReplyKind::Status, &Command::new("MONITOR"))?;
        Ok(())
    }

    /// Make the server replicate from `master`, or stop replicating when
    /// `master` is `None` (or its port is 0)
    pub fn slaveof(&mut self, master: Option<(&str, u16)>) -> Result<()> {
        let command = match master {
            Some((host, port)) if port != 0 => Command::new("SLAVEOF").arg(host).arg(port),
            _ => Command::new("SLAVEOF").arg("no").arg("one"),
        };
        self.send_and_receive(ReplyKind::Status, &command)?;
        Ok(())
    }

    /// Add `member` to the set at `key`.
    ///
    /// Returns false when it was already a member.
    pub fn sadd(&mut self, key: &[u8], member: &[u8]) -> Result<bool> {
        let reply = self.send_and_receive(
            ReplyKind::Integer,
            &Command::new("SADD").arg(key).arg(member),
        )?;
        Ok(reply.as_integer().unwrap_or_default() != 0)
    }

    /// Add `member` with `score` to the sorted set at `key`.
    ///
    /// Returns false when it was already a member and only its score changed.
    pub fn zadd(&mut self, key: &[u8], score: f64, member: &[u8]) -> Result<bool> {
        let reply = self.send_and_receive(
            ReplyKind::Integer,
            &Command::new("ZADD").arg(key).arg(score).arg(member),
        )?;
        Ok(reply.as_integer().unwrap_or_default() != 0)
    }

    /// Ask the server to close the connection, then close it
    pub fn quit(mut self) -> Result<()> {
        self.send_and_receive(ReplyKind::Status, &Command::new("QUIT"))?;
        self.close();
        Ok(())
    }
}
