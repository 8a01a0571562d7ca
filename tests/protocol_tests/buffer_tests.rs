//! Tests for GrowableBuffer
//!
//! These tests verify:
//! - Initial layout and cursor handling
//! - Growth in whole increments
//! - Content preservation across growth
//! - Reset keeps capacity

use kvline::protocol::{GrowableBuffer, BUFFER_INCREMENT};

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_new_buffer_layout() {
    let buffer = GrowableBuffer::new();

    assert_eq!(buffer.capacity(), BUFFER_INCREMENT);
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.cursor(), 0);
    assert!(buffer.is_empty());
    assert_eq!(buffer.headroom(), BUFFER_INCREMENT);
    assert_eq!(buffer.low_water_mark(), BUFFER_INCREMENT / 10 + 1);
}

#[test]
fn test_commit_and_consume() {
    let mut buffer = GrowableBuffer::new();
    buffer.spare_mut()[..5].copy_from_slice(b"hello");
    buffer.commit(5);

    assert_eq!(buffer.filled(), b"hello");
    assert_eq!(buffer.unconsumed(), b"hello");

    buffer.consume_to(2);
    assert_eq!(buffer.cursor(), 2);
    assert_eq!(buffer.unconsumed(), b"llo");
    assert_eq!(buffer.slice(1, 3), b"ell");
}

#[test]
#[should_panic]
fn test_commit_past_capacity_panics() {
    let mut buffer = GrowableBuffer::with_capacity(4);
    buffer.commit(5);
}

#[test]
fn test_reset_keeps_capacity() {
    let mut buffer = GrowableBuffer::new();
    buffer.extend_from_slice(&vec![7u8; BUFFER_INCREMENT + 1]).unwrap();
    let capacity = buffer.capacity();

    buffer.consume_to(10);
    buffer.reset();

    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.cursor(), 0);
    assert_eq!(buffer.capacity(), capacity);
}

// =============================================================================
// Growth Tests
// =============================================================================

#[test]
fn test_grow_rounds_up_to_increments() {
    let mut buffer = GrowableBuffer::new();

    buffer.grow(1).unwrap();
    assert_eq!(buffer.capacity(), 2 * BUFFER_INCREMENT);

    buffer.grow(BUFFER_INCREMENT).unwrap();
    assert_eq!(buffer.capacity(), 3 * BUFFER_INCREMENT);

    buffer.grow(BUFFER_INCREMENT + 1).unwrap();
    assert_eq!(buffer.capacity(), 5 * BUFFER_INCREMENT);
}

#[test]
fn test_grow_zero_still_adds_one_increment() {
    let mut buffer = GrowableBuffer::new();
    buffer.grow(0).unwrap();
    assert_eq!(buffer.capacity(), 2 * BUFFER_INCREMENT);
}

#[test]
fn test_ensure_is_noop_with_enough_headroom() {
    let mut buffer = GrowableBuffer::new();
    buffer.ensure(BUFFER_INCREMENT).unwrap();
    assert_eq!(buffer.capacity(), BUFFER_INCREMENT);

    buffer.commit(100);
    buffer.ensure(BUFFER_INCREMENT - 100).unwrap();
    assert_eq!(buffer.capacity(), BUFFER_INCREMENT);
}

#[test]
fn test_ensure_grows_when_headroom_short() {
    let mut buffer = GrowableBuffer::new();
    buffer.commit(BUFFER_INCREMENT - 10);

    buffer.ensure(11).unwrap();

    assert_eq!(buffer.capacity(), 2 * BUFFER_INCREMENT);
    assert!(buffer.headroom() >= 11);
}

#[test]
fn test_growth_preserves_filled_bytes() {
    let mut buffer = GrowableBuffer::new();
    let content: Vec<u8> = (0..BUFFER_INCREMENT).map(|i| (i % 251) as u8).collect();
    buffer.extend_from_slice(&content).unwrap();
    buffer.consume_to(123);

    let before = buffer.filled().to_vec();
    buffer.grow(3 * BUFFER_INCREMENT).unwrap();

    assert_eq!(buffer.filled(), &before[..]);
    assert_eq!(buffer.cursor(), 123);
    assert_eq!(buffer.len(), BUFFER_INCREMENT);
}

#[test]
fn test_extend_across_many_growths() {
    let mut buffer = GrowableBuffer::new();
    let mut expected = Vec::new();

    for round in 0..10u8 {
        let chunk = vec![round; 1500];
        buffer.extend_from_slice(&chunk).unwrap();
        expected.extend_from_slice(&chunk);
    }

    assert_eq!(buffer.filled(), &expected[..]);
    assert_eq!(buffer.capacity() % BUFFER_INCREMENT, 0);
    assert!(buffer.capacity() >= expected.len());
}

#[test]
fn test_grow_overflow_reports_out_of_memory() {
    let mut buffer = GrowableBuffer::new();
    buffer.extend_from_slice(b"keep").unwrap();

    let err = buffer.grow(usize::MAX).unwrap_err();

    assert!(matches!(err, kvline::ClientError::OutOfMemory { .. }));
    assert_eq!(buffer.filled(), b"keep");
    assert_eq!(buffer.capacity(), BUFFER_INCREMENT);
}
