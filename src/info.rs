//! Server information
//!
//! Scanners for the text report returned by `INFO`: the negotiated server
//! version used during the handshake, and the [`ServerInfo`] record filled by
//! `Connection::info`.
//!
//! The report is a list of `key:value` lines. Fields change with virtually
//! every server release, so the scanner assigns the keys it knows, ignores
//! the rest, and leaves missing fields at their zero defaults. This keeps the
//! record both backward and forward compatible.

use std::fmt;

use crate::protocol::parse_integer;

/// Widths of the text fields, in characters
const VERSION_TEXT_WIDTH: usize = 32;
const MULTIPLEXING_API_WIDTH: usize = 16;
const USED_MEMORY_HUMAN_WIDTH: usize = 32;

// =============================================================================
// Server Version
// =============================================================================

/// Version negotiated during the handshake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Find the `redis_version:` field in an info report.
    ///
    /// Accepts `major.minor.patch` and the legacy two-component `major.minor`
    /// form, where the second component is the patch level (`1.02` is
    /// `1.0.2`). Returns `None` when no line carries at least two components.
    pub fn from_info(report: &[u8]) -> Option<Self> {
        report_lines(report)
            .filter_map(|(key, value)| (key == "redis_version").then_some(value))
            .find_map(Self::parse)
    }

    /// Parse a version value such as `2.8.19` or `1.02`
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().splitn(3, '.');
        let major = parts.next().and_then(leading_number)?;
        let second = parts.next().and_then(leading_number)?;

        match parts.next().and_then(leading_number) {
            Some(patch) => Some(Self::new(major, second, patch)),
            None => Some(Self::new(major, 0, second)),
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Digits at the start of `text`; `None` when there are none
fn leading_number(text: &str) -> Option<u32> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

// =============================================================================
// Server Info
// =============================================================================

/// Replication role reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRole {
    Master,
    Slave,
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerRole::Master => f.write_str("master"),
            ServerRole::Slave => f.write_str("slave"),
        }
    }
}

/// Fields of the info report known to this client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub redis_version: String,
    pub arch_bits: i32,
    pub multiplexing_api: String,
    pub process_id: i64,
    pub uptime_in_seconds: i64,
    pub uptime_in_days: i64,
    pub connected_clients: i32,
    pub connected_slaves: i32,
    pub blocked_clients: i32,
    pub used_memory: u64,
    pub used_memory_human: String,
    pub changes_since_last_save: i64,
    pub bgsave_in_progress: i32,
    pub last_save_time: i64,
    pub bgrewriteaof_in_progress: i32,
    pub total_connections_received: i64,
    pub total_commands_processed: i64,
    pub expired_keys: i64,
    pub hash_max_zipmap_entries: u64,
    pub hash_max_zipmap_value: u64,
    pub pubsub_channels: i64,
    pub pubsub_patterns: u32,
    pub vm_enabled: i32,
    /// `None` when the report has no role line
    pub role: Option<ServerRole>,
}

impl ServerInfo {
    /// Scan an info report
    pub fn parse(report: &[u8]) -> Self {
        let mut info = ServerInfo::default();

        for (key, value) in report_lines(report) {
            match key {
                "redis_version" => info.redis_version = text(value, VERSION_TEXT_WIDTH),
                "arch_bits" => info.arch_bits = number(value),
                "multiplexing_api" => {
                    info.multiplexing_api = text(value, MULTIPLEXING_API_WIDTH)
                }
                "process_id" => info.process_id = number(value),
                "uptime_in_seconds" => info.uptime_in_seconds = number(value),
                "uptime_in_days" => info.uptime_in_days = number(value),
                "connected_clients" => info.connected_clients = number(value),
                "connected_slaves" => info.connected_slaves = number(value),
                "blocked_clients" => info.blocked_clients = number(value),
                "used_memory" => info.used_memory = number(value),
                "used_memory_human" => {
                    info.used_memory_human = text(value, USED_MEMORY_HUMAN_WIDTH)
                }
                "changes_since_last_save" => info.changes_since_last_save = number(value),
                "bgsave_in_progress" => info.bgsave_in_progress = number(value),
                "last_save_time" => info.last_save_time = number(value),
                "bgrewriteaof_in_progress" => info.bgrewriteaof_in_progress = number(value),
                "total_connections_received" => {
                    info.total_connections_received = number(value)
                }
                "total_commands_processed" => info.total_commands_processed = number(value),
                "expired_keys" => info.expired_keys = number(value),
                "hash_max_zipmap_entries" => info.hash_max_zipmap_entries = number(value),
                "hash_max_zipmap_value" => info.hash_max_zipmap_value = number(value),
                "pubsub_channels" => info.pubsub_channels = number(value),
                "pubsub_patterns" => info.pubsub_patterns = number(value),
                "vm_enabled" => info.vm_enabled = number(value),
                "role" => {
                    info.role = value.trim().chars().next().map(|c| match c {
                        'm' => ServerRole::Master,
                        _ => ServerRole::Slave,
                    })
                }
                _ => {}
            }
        }

        info
    }
}

/// `key:value` pairs of a report; blank lines, `#` section headers and lines
/// without a colon are skipped
fn report_lines(report: &[u8]) -> impl Iterator<Item = (&str, &str)> {
    report
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter_map(|line| std::str::from_utf8(line).ok())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
}

/// Leading decimal value; anything unparsable or out of range is zero
fn number<N: TryFrom<i64> + Default>(value: &str) -> N {
    N::try_from(parse_integer(value.as_bytes())).unwrap_or_default()
}

/// First whitespace-delimited token, cut to `width` characters
fn text(value: &str, width: usize) -> String {
    value
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .take(width)
        .collect()
}
