//! Command Tests
//!
//! Tests for request rendering.

use kvline::{Arg, Command};

// =============================================================================
// Rendering Tests
// =============================================================================

#[test]
fn test_render_name_only() {
    assert_eq!(Command::new("PING").to_bytes(), b"*1\r\n$4\r\nPING\r\n");
}

#[test]
fn test_render_with_arguments() {
    let cmd = Command::new("SADD").arg("fruits").arg(&b"banana"[..]);
    assert_eq!(
        cmd.to_bytes(),
        b"*3\r\n$4\r\nSADD\r\n$6\r\nfruits\r\n$6\r\nbanana\r\n"
    );
}

#[test]
fn test_render_numeric_arguments() {
    let cmd = Command::new("ZADD").arg("k").arg(1.5).arg("m");
    assert_eq!(
        cmd.to_bytes(),
        b"*4\r\n$4\r\nZADD\r\n$1\r\nk\r\n$3\r\n1.5\r\n$1\r\nm\r\n"
    );

    let cmd = Command::new("SLAVEOF").arg("10.0.0.1").arg(6380u16);
    assert_eq!(
        cmd.to_bytes(),
        b"*3\r\n$7\r\nSLAVEOF\r\n$8\r\n10.0.0.1\r\n$4\r\n6380\r\n"
    );

    let cmd = Command::new("INCRBY").arg("n").arg(-42i64);
    assert_eq!(
        cmd.to_bytes(),
        b"*3\r\n$6\r\nINCRBY\r\n$1\r\nn\r\n$3\r\n-42\r\n"
    );
}

#[test]
fn test_render_binary_argument() {
    let value = [0u8, b'\r', b'\n', 255];
    let bytes = Command::new("SET").arg("k").arg(&value).to_bytes();

    let mut expected = b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$4\r\n".to_vec();
    expected.extend_from_slice(&value);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(bytes, expected);
}

#[test]
fn test_render_empty_argument() {
    let cmd = Command::new("ECHO").arg("");
    assert_eq!(cmd.to_bytes(), b"*2\r\n$4\r\nECHO\r\n$0\r\n\r\n");
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_render_reports_full_length_when_truncated() {
    let cmd = Command::new("SADD").arg("key").arg("member");
    let full = cmd.to_bytes();

    let mut small = [0u8; 10];
    let len = cmd.render(&mut small);

    assert_eq!(len, full.len());
    assert_eq!(&small[..], &full[..10]);
}

#[test]
fn test_render_is_deterministic() {
    let cmd = Command::new("ZADD").arg("scores").arg(0.1).arg("alice");

    let mut first = vec![0u8; 8];
    let needed = cmd.render(&mut first);
    let mut second = vec![0u8; needed];
    let written = cmd.render(&mut second);

    assert_eq!(needed, written);
    assert_eq!(second, cmd.to_bytes());
    assert_eq!(cmd.encoded_len(), needed);
}

#[test]
fn test_render_into_empty_slice() {
    let cmd = Command::new("PING");
    assert_eq!(cmd.render(&mut []), 14);
}

// =============================================================================
// Argument and Display Tests
// =============================================================================

#[test]
fn test_push_in_place() {
    let member = String::from("member");
    let mut cmd = Command::new("SADD");
    cmd.push("set");
    cmd.push(&member);

    assert_eq!(
        cmd.args(),
        &[
            Arg::Bytes(b"SADD"),
            Arg::Bytes(b"set"),
            Arg::Bytes(b"member")
        ]
    );
}

#[test]
fn test_argument_conversions() {
    assert_eq!(Arg::from(7i32), Arg::Int(7));
    assert_eq!(Arg::from(7u32), Arg::Int(7));
    assert_eq!(Arg::from(2.5f64), Arg::Float(2.5));
    assert_eq!(Arg::from("x"), Arg::Bytes(b"x"));
}

#[test]
fn test_display_joins_arguments() {
    let cmd = Command::new("ZADD").arg("k").arg(2.5).arg("m");
    assert_eq!(cmd.to_string(), "ZADD k 2.5 m");
    assert_eq!(Command::new("SLAVEOF").arg("no").arg("one").to_string(), "SLAVEOF no one");
}
