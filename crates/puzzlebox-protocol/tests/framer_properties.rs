//! Property-based tests for the line framer.
//!
//! These tests use proptest to generate random byte streams and random chunk
//! boundaries, and check that the messages coming out of the framer depend
//! only on the stream, never on how it was split.

use std::collections::VecDeque;
use std::convert::Infallible;

use proptest::prelude::*;
use puzzlebox_protocol::LineFramer;

/// Strategy for board output: short codes separated by terminators.
fn board_stream() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9a-z\r\n]{0,200}")
        .expect("Failed to create board stream regex strategy")
}

/// Strategy for chunk sizes used to cut the stream into reads.
fn chunk_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..16, 1..64)
}

/// Lines the framer is expected to deliver for `stream`.
fn expected_lines(stream: &str) -> Vec<String> {
    stream
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deliver `stream` in chunks, polling the framer after every chunk like the
/// control loop does once per tick.
fn run_framer(stream: &[u8], sizes: &[usize]) -> Vec<String> {
    let mut framer = LineFramer::new();
    let mut link: VecDeque<u8> = VecDeque::new();
    let mut out = Vec::new();
    let mut offset = 0;
    let mut size_iter = sizes.iter().cycle();

    while offset < stream.len() {
        let size = *size_iter.next().unwrap();
        let end = (offset + size).min(stream.len());
        link.extend(&stream[offset..end]);
        offset = end;

        // One message per tick at most
        if let Some(line) = framer
            .take_message(|| Ok::<_, Infallible>(link.pop_front()))
            .unwrap()
        {
            out.push(line);
        }
    }

    // Keep ticking until everything buffered has been delivered
    while let Some(line) = framer
        .take_message(|| Ok::<_, Infallible>(link.pop_front()))
        .unwrap()
    {
        out.push(line);
    }

    out
}

proptest! {
    /// Property: chunk boundaries never change the delivered messages.
    #[test]
    fn prop_chunking_invariance(stream in board_stream(), sizes in chunk_sizes()) {
        let delivered = run_framer(stream.as_bytes(), &sizes);
        prop_assert_eq!(delivered, expected_lines(&stream));
    }

    /// Property: feeding one byte at a time delivers every line exactly once.
    #[test]
    fn prop_byte_at_a_time(stream in board_stream()) {
        let delivered = run_framer(stream.as_bytes(), &[1]);
        prop_assert_eq!(delivered, expected_lines(&stream));
    }

    /// Property: a held line is never overwritten by later input.
    #[test]
    fn prop_first_line_is_held(
        first in "[0-9]{1,4}",
        rest in "[0-9\n]{0,40}",
    ) {
        let mut link: VecDeque<u8> = format!("{first}\n{rest}").bytes().collect();
        let mut framer = LineFramer::new();

        framer.feed(|| Ok::<_, Infallible>(link.pop_front())).unwrap();
        framer.feed(|| Ok::<_, Infallible>(link.pop_front())).unwrap();

        let held = framer
            .take_message(|| Ok::<_, Infallible>(link.pop_front()))
            .unwrap();
        prop_assert_eq!(held, Some(first));
    }
}

#[test]
fn test_twenty_then_twenty_one() {
    let mut link: VecDeque<u8> = VecDeque::new();
    let mut framer = LineFramer::new();

    link.extend(b"20\n");
    framer.feed(|| Ok::<_, Infallible>(link.pop_front())).unwrap();
    link.extend(b"21\n");
    framer.feed(|| Ok::<_, Infallible>(link.pop_front())).unwrap();

    assert!(framer.is_ready());
    assert_eq!(link.len(), 3);

    let first = framer
        .take_message(|| Ok::<_, Infallible>(link.pop_front()))
        .unwrap();
    let second = framer
        .take_message(|| Ok::<_, Infallible>(link.pop_front()))
        .unwrap();

    assert_eq!(first.as_deref(), Some("20"));
    assert_eq!(second.as_deref(), Some("21"));
}
