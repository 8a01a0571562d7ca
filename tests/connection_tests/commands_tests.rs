//! Command Wrapper Tests
//!
//! Tests for the typed command wrappers, checked against the requests they
//! put on the wire.

#[path = "../support/mod.rs"]
mod support;

use kvline::{ClientConfig, ClientError, Connection, ServerRole, ServerVersion};
use support::{bulk, error, info_reply, integer, spawn_server, status, FakeServer, ScriptedTransport};

fn args(parts: &[&str]) -> Vec<Vec<u8>> {
    parts.iter().map(|part| part.as_bytes().to_vec()).collect()
}

/// Connect to a fake server that answers the handshake and then `replies`
fn connect_with(replies: Vec<Vec<u8>>) -> (Connection, FakeServer) {
    let mut all = vec![info_reply("2.8.19")];
    all.extend(replies);
    let server = spawn_server(all);

    let config = ClientConfig::builder()
        .port(server.port())
        .timeout_ms(2000)
        .build();
    let conn = Connection::connect(&config).unwrap();
    (conn, server)
}

// =============================================================================
// Status Command Tests
// =============================================================================

#[test]
fn test_ping() {
    let (mut conn, server) = connect_with(vec![status("PONG")]);

    conn.ping().unwrap();
    conn.close();

    let requests = server.finish();
    assert_eq!(requests[1], args(&["PING"]));
}

#[test]
fn test_auth() {
    let (mut conn, server) = connect_with(vec![status("OK")]);

    conn.auth("s3cret").unwrap();
    conn.close();

    assert_eq!(server.finish()[1], args(&["AUTH", "s3cret"]));
}

#[test]
fn test_auth_rejected() {
    let mut conn = Connection::with_transport(
        ScriptedTransport::new().data(&error("ERR invalid password")),
        100,
    );

    assert!(matches!(conn.auth("wrong"), Err(ClientError::Server(_))));
    assert_eq!(conn.last_error_text(), Some("ERR invalid password"));
    assert!(!conn.is_broken());
}

#[test]
fn test_monitor() {
    let (mut conn, server) = connect_with(vec![status("OK")]);

    conn.monitor().unwrap();
    conn.close();

    assert_eq!(server.finish()[1], args(&["MONITOR"]));
}

#[test]
fn test_slaveof_master() {
    let (mut conn, server) = connect_with(vec![status("OK")]);

    conn.slaveof(Some(("10.0.0.5", 6380))).unwrap();
    conn.close();

    assert_eq!(server.finish()[1], args(&["SLAVEOF", "10.0.0.5", "6380"]));
}

#[test]
fn test_slaveof_no_one() {
    let (mut conn, server) = connect_with(vec![status("OK"), status("OK")]);

    conn.slaveof(None).unwrap();
    conn.slaveof(Some(("10.0.0.5", 0))).unwrap();
    conn.close();

    let requests = server.finish();
    assert_eq!(requests[1], args(&["SLAVEOF", "no", "one"]));
    assert_eq!(requests[2], args(&["SLAVEOF", "no", "one"]));
}

#[test]
fn test_quit() {
    let (conn, server) = connect_with(vec![status("OK")]);

    conn.quit().unwrap();

    assert_eq!(server.finish()[1], args(&["QUIT"]));
}

// =============================================================================
// Integer Command Tests
// =============================================================================

#[test]
fn test_sadd() {
    let (mut conn, server) = connect_with(vec![integer(1), integer(0)]);

    assert!(conn.sadd(b"fruits", b"banana").unwrap());
    assert!(!conn.sadd(b"fruits", b"banana").unwrap());
    conn.close();

    let requests = server.finish();
    assert_eq!(requests[1], args(&["SADD", "fruits", "banana"]));
    assert_eq!(requests[2], requests[1]);
}

#[test]
fn test_sadd_binary_member() {
    let member = [0u8, 1, b'\r', b'\n', 255];
    let (mut conn, server) = connect_with(vec![integer(1)]);

    assert!(conn.sadd(b"bin", &member).unwrap());
    conn.close();

    assert_eq!(server.finish()[1], vec![b"SADD".to_vec(), b"bin".to_vec(), member.to_vec()]);
}

#[test]
fn test_zadd() {
    let (mut conn, server) = connect_with(vec![integer(1), integer(0)]);

    assert!(conn.zadd(b"scores", 1.5, b"alice").unwrap());
    assert!(!conn.zadd(b"scores", -2.0, b"alice").unwrap());
    conn.close();

    let requests = server.finish();
    assert_eq!(requests[1], args(&["ZADD", "scores", "1.5", "alice"]));
    assert_eq!(requests[2], args(&["ZADD", "scores", "-2", "alice"]));
}

#[test]
fn test_sadd_wrong_reply_shape() {
    let mut conn =
        Connection::with_transport(ScriptedTransport::new().data(&status("OK")), 100);

    assert!(matches!(
        conn.sadd(b"k", b"m"),
        Err(ClientError::Protocol(_))
    ));
    assert!(conn.is_broken());
}

// =============================================================================
// Info Tests
// =============================================================================

#[test]
fn test_info() {
    let report = "# Server\r\n\
                  redis_version:2.8.19\r\n\
                  arch_bits:64\r\n\
                  multiplexing_api:epoll\r\n\
                  process_id:4242\r\n\
                  connected_clients:3\r\n\
                  used_memory:1048576\r\n\
                  used_memory_human:1.00M\r\n\
                  role:slave\r\n\
                  some_future_field:whatever\r\n";
    let (mut conn, server) = connect_with(vec![bulk(report.as_bytes())]);

    let info = conn.info().unwrap();
    conn.close();

    assert_eq!(info.redis_version, "2.8.19");
    assert_eq!(info.arch_bits, 64);
    assert_eq!(info.multiplexing_api, "epoll");
    assert_eq!(info.process_id, 4242);
    assert_eq!(info.connected_clients, 3);
    assert_eq!(info.used_memory, 1_048_576);
    assert_eq!(info.used_memory_human, "1.00M");
    assert_eq!(info.role, Some(ServerRole::Slave));
    assert_eq!(info.blocked_clients, 0);

    assert_eq!(server.finish()[1], args(&["INFO"]));
}

#[test]
fn test_info_nil_report_is_default() {
    let mut conn =
        Connection::with_transport(ScriptedTransport::new().data(b"$-1\r\n"), 100);

    assert_eq!(conn.info().unwrap(), kvline::ServerInfo::default());
}

#[test]
fn test_handshake_version_visible_to_wrappers() {
    let (conn, server) = connect_with(Vec::new());

    assert_eq!(conn.server_version(), ServerVersion::new(2, 8, 19));
    conn.close();

    assert_eq!(server.finish(), vec![args(&["INFO"])]);
}
