//! End-to-end scenarios for `InputStream` over plain byte regions.
//!
//! Covers the documented walkthroughs (a boolean followed by an `i32`, an
//! absolute peek before any sequential read), construction with a length
//! cap, both skip flavours, and that absolute peeks never disturb the
//! sequential results they are interleaved with.

use bytes::Bytes;
use interop_stream::{ErrorKind, InputStream, InteropMemory, StreamError};
use interop_tests::{NativeWriter, bool_and_int};

// ── Walkthroughs ──────────────────────────────────────────────────────────────

#[test]
fn bool_then_int_then_insufficient() {
    let mem = bool_and_int();
    let mut stream = InputStream::new(&mem);

    assert!(stream.read_bool().unwrap());
    assert_eq!(stream.position(), 1);
    assert_eq!(stream.read_i32().unwrap(), 42);
    assert_eq!(stream.position(), 5);
    assert_eq!(stream.remaining(), 3);

    let err = stream.read_i32().unwrap_err();
    assert_eq!(
        err,
        StreamError::InsufficientData {
            memory: mem.id(),
            len: 8,
            pos: 5,
            requested: 4,
        }
    );
    assert_eq!(stream.position(), 5);
    assert_eq!(stream.len(), 8);
}

#[test]
fn peek_before_any_sequential_read() {
    let mem = bool_and_int();
    let stream = InputStream::new(&mem);

    assert_eq!(stream.read_i32_at(4).unwrap(), 0);
    assert_eq!(stream.position(), 0);
}

#[test]
fn backpatched_length_is_read_back_in_place() {
    // [len: i32][payload: i16 x len], where len was patched after the payload.
    let mem = NativeWriter::new()
        .i32(3)
        .i16(10)
        .i16(-20)
        .i16(30)
        .into_vec();
    let mut stream = InputStream::new(&mem);
    stream.skip(4).unwrap();

    let count = stream.read_i32_at(0).unwrap();
    assert_eq!(count, 3);

    let mut payload = vec![0i16; 3];
    stream.read_i16_array(&mut payload).unwrap();
    assert_eq!(payload, [10, -20, 30]);
    assert_eq!(stream.remaining(), 0);
}

#[test]
fn mixed_record_decodes_in_order() {
    let mem = NativeWriter::new()
        .i8(-1)
        .u16(0xBEEF)
        .i64(-5)
        .f32_bits(2.5f32.to_bits())
        .f64_bits(1e300f64.to_bits())
        .raw(&[1, 0, 2])
        .freeze();
    let mut stream = InputStream::new(&mem);

    assert_eq!(stream.read_i8().unwrap(), -1);
    assert_eq!(stream.read_u16().unwrap(), 0xBEEF);
    assert_eq!(stream.read_i64().unwrap(), -5);
    assert_eq!(stream.read_f32().unwrap().to_bits(), 2.5f32.to_bits());
    assert_eq!(stream.read_f64().unwrap().to_bits(), 1e300f64.to_bits());

    let mut flags = [false; 3];
    stream.read_bool_array(&mut flags).unwrap();
    assert_eq!(flags, [true, false, false]);
    assert_eq!(stream.remaining(), 0);
}

#[test]
fn bytes_region_is_accepted() {
    let mem = Bytes::from(bool_and_int());
    let mut stream = InputStream::new(&mem);
    stream.skip(1).unwrap();
    assert_eq!(stream.read_i32().unwrap(), 42);
    assert_eq!(stream.memory().id(), mem.id());
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn cap_equal_to_length_succeeds() {
    let mem = bool_and_int();
    let stream = InputStream::with_len(&mem, 8).unwrap();
    assert_eq!(stream.remaining(), 8);
}

#[test]
fn cap_past_length_is_out_of_range() {
    let mem = bool_and_int();
    let err = InputStream::with_len(&mem, 9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!(err.memory(), mem.id());
}

#[test]
fn cap_hides_the_tail() {
    let mem = bool_and_int();
    let mut stream = InputStream::with_len(&mem, 5).unwrap();
    stream.skip(1).unwrap();
    assert_eq!(stream.read_i32().unwrap(), 42);
    assert!(stream.read_i8().is_err());
    assert!(stream.read_i8_at(5).is_err());
}

#[test]
fn empty_region() {
    let mem: &[u8] = &[];
    let mut stream = InputStream::new(mem);
    assert!(stream.is_empty());
    assert_eq!(stream.remaining(), 0);
    assert!(stream.read_bool().is_err());
    stream.set_position(0).unwrap();
    assert!(stream.set_position(1).is_err());
}

// ── Skip ──────────────────────────────────────────────────────────────────────

#[test]
fn checked_skip_refuses_to_pass_the_end() {
    let mem = bool_and_int();
    let mut stream = InputStream::new(&mem);

    let err = stream.skip(9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert_eq!(stream.position(), 0);

    stream.skip(8).unwrap();
    assert_eq!(stream.remaining(), 0);
}

#[test]
fn unchecked_skip_passes_the_end_then_reads_fail() {
    let mem = bool_and_int();
    let mut stream = InputStream::new(&mem);

    stream.skip_unchecked(12);
    assert_eq!(stream.position(), 12);
    assert_eq!(stream.remaining(), 0);

    let err = stream.read_i8().unwrap_err();
    assert_eq!(
        err,
        StreamError::InsufficientData {
            memory: mem.id(),
            len: 8,
            pos: 12,
            requested: 1,
        }
    );

    // Bytes inside the length stay reachable by absolute offset.
    assert_eq!(stream.read_i32_at(1).unwrap(), 42);
    assert!(stream.read_i32_at(6).is_err());

    stream.set_position(5).unwrap();
    assert_eq!(stream.remaining(), 3);
}

// ── Absolute/sequential independence ──────────────────────────────────────────

#[test]
fn peeks_do_not_change_sequential_results() {
    let mem = NativeWriter::new()
        .i32(1)
        .i32(2)
        .i32(3)
        .i32(4)
        .into_vec();

    let mut plain = InputStream::new(&mem);
    let mut expected = Vec::new();
    while plain.remaining() > 0 {
        expected.push(plain.read_i32().unwrap());
    }

    let mut mixed = InputStream::new(&mem);
    let mut actual = Vec::new();
    for peek_at in [12, 0, 8, 4] {
        let before = mixed.position();
        mixed.read_i32_at(peek_at).unwrap();
        mixed.read_i16_at(peek_at).unwrap();
        mixed.read_i8_at(peek_at).unwrap();
        assert_eq!(mixed.position(), before);
        actual.push(mixed.read_i32().unwrap());
    }

    assert_eq!(actual, expected);
}
