//! Property-based tests for `InputStream`.
//!
//! Random regions and random operation sequences check the stream's
//! bookkeeping: the position never leaves `0..=len`, failures change
//! nothing, successful reads consume exactly their width, and absolute
//! peeks are invisible to sequential decoding.

use interop_stream::{InputStream, StreamError};
use interop_tests::NativeWriter;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    I8,
    Bool,
    I16,
    U16,
    I32,
    I64,
    F32,
    F64,
    I8At(usize),
    I16At(usize),
    I32At(usize),
    I32Array(usize),
    F64Array(usize),
    BoolArray(usize),
    SetPosition(usize),
    Skip(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::I8),
        Just(Op::Bool),
        Just(Op::I16),
        Just(Op::U16),
        Just(Op::I32),
        Just(Op::I64),
        Just(Op::F32),
        Just(Op::F64),
        (0usize..80).prop_map(Op::I8At),
        (0usize..80).prop_map(Op::I16At),
        (0usize..80).prop_map(Op::I32At),
        (0usize..12).prop_map(Op::I32Array),
        (0usize..6).prop_map(Op::F64Array),
        (0usize..40).prop_map(Op::BoolArray),
        (0usize..80).prop_map(Op::SetPosition),
        (0usize..40).prop_map(Op::Skip),
    ]
}

/// Apply `op`; return how many bytes a successful call must consume, or
/// `None` when the call repositions or consumes nothing by definition.
fn apply(stream: &mut InputStream<'_, Vec<u8>>, op: &Op) -> (Result<(), StreamError>, Option<usize>) {
    match *op {
        Op::I8 => (stream.read_i8().map(drop), Some(1)),
        Op::Bool => (stream.read_bool().map(drop), Some(1)),
        Op::I16 => (stream.read_i16().map(drop), Some(2)),
        Op::U16 => (stream.read_u16().map(drop), Some(2)),
        Op::I32 => (stream.read_i32().map(drop), Some(4)),
        Op::I64 => (stream.read_i64().map(drop), Some(8)),
        Op::F32 => (stream.read_f32().map(drop), Some(4)),
        Op::F64 => (stream.read_f64().map(drop), Some(8)),
        Op::I8At(at) => (stream.read_i8_at(at).map(drop), Some(0)),
        Op::I16At(at) => (stream.read_i16_at(at).map(drop), Some(0)),
        Op::I32At(at) => (stream.read_i32_at(at).map(drop), Some(0)),
        Op::I32Array(n) => {
            let mut out = vec![0x5A5A_5A5Ai32; n];
            let res = stream.read_i32_array(&mut out);
            if res.is_err() {
                assert!(out.iter().all(|&v| v == 0x5A5A_5A5A), "output written on failure");
            }
            (res, Some(4 * n))
        }
        Op::F64Array(n) => {
            let mut out = vec![0.5f64; n];
            let res = stream.read_f64_array(&mut out);
            if res.is_err() {
                assert!(out.iter().all(|&v| v.to_bits() == 0.5f64.to_bits()), "output written on failure");
            }
            (res, Some(8 * n))
        }
        Op::BoolArray(n) => {
            let mut out = vec![true; n];
            let res = stream.read_bool_array(&mut out);
            if res.is_err() {
                assert!(out.iter().all(|&v| v), "output written on failure");
            }
            (res, Some(n))
        }
        Op::SetPosition(p) => (stream.set_position(p), None),
        Op::Skip(n) => (stream.skip(n), Some(n)),
    }
}

proptest! {
    #[test]
    fn position_stays_in_bounds_and_failures_change_nothing(
        bytes in proptest::collection::vec(any::<u8>(), 0..64),
        ops in proptest::collection::vec(arb_op(), 0..40),
    ) {
        let mut stream = InputStream::new(&bytes);

        for op in &ops {
            let pos = stream.position();
            let len = stream.len();
            let remaining = stream.remaining();

            let (result, width) = apply(&mut stream, op);

            prop_assert!(stream.position() <= stream.len());
            prop_assert_eq!(stream.len(), len);

            match (result, width) {
                (Err(_), _) => prop_assert_eq!(stream.position(), pos),
                (Ok(()), Some(w)) => {
                    prop_assert_eq!(stream.remaining(), remaining - w);
                    prop_assert_eq!(stream.position(), pos + w);
                }
                (Ok(()), None) => {}
            }
        }
    }

    #[test]
    fn failing_read_is_reported_exactly_when_too_short(
        bytes in proptest::collection::vec(any::<u8>(), 0..16),
        start in 0usize..16,
    ) {
        let mut stream = InputStream::new(&bytes);
        prop_assume!(start <= bytes.len());
        stream.set_position(start).unwrap();

        let res = stream.read_i64();
        prop_assert_eq!(res.is_ok(), bytes.len() - start >= 8);
    }

    #[test]
    fn set_position_leaves_len_minus_p(
        len in 0usize..64,
        p in 0usize..80,
    ) {
        let bytes = vec![0u8; len];
        let mut stream = InputStream::new(&bytes);
        match stream.set_position(p) {
            Ok(()) => prop_assert_eq!(stream.remaining(), len - p),
            Err(_) => {
                prop_assert!(p > len);
                prop_assert_eq!(stream.position(), 0);
            }
        }
    }

    #[test]
    fn capped_construction(len in 0usize..32, cap in 0usize..64) {
        let bytes = vec![0u8; len];
        match InputStream::with_len(&bytes, cap) {
            Ok(stream) => {
                prop_assert!(cap <= len);
                prop_assert_eq!(stream.remaining(), cap);
            }
            Err(_) => prop_assert!(cap > len),
        }
    }

    #[test]
    fn f32_bits_roundtrip(bits in any::<u32>()) {
        let bytes = NativeWriter::new().f32_bits(bits).into_vec();
        let mut stream = InputStream::new(&bytes);
        prop_assert_eq!(stream.read_f32().unwrap().to_bits(), bits);
    }

    #[test]
    fn f64_bits_roundtrip(bits in any::<u64>()) {
        let bytes = NativeWriter::new().f64_bits(bits).into_vec();
        let mut stream = InputStream::new(&bytes);
        prop_assert_eq!(stream.read_f64().unwrap().to_bits(), bits);
    }

    #[test]
    fn float_arrays_copy_bits_verbatim(bits in proptest::collection::vec(any::<u64>(), 0..16)) {
        let bytes = bits
            .iter()
            .fold(NativeWriter::new(), |w, &b| w.f64_bits(b))
            .into_vec();
        let mut stream = InputStream::new(&bytes);
        let mut out = vec![0f64; bits.len()];
        stream.read_f64_array(&mut out).unwrap();
        let decoded: Vec<u64> = out.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(decoded, bits);
    }

    #[test]
    fn f32_arrays_copy_bits_verbatim(bits in proptest::collection::vec(any::<u32>(), 0..16)) {
        let bytes = bits
            .iter()
            .fold(NativeWriter::new(), |w, &b| w.f32_bits(b))
            .into_vec();
        let mut stream = InputStream::new(&bytes);
        let mut out = vec![0f32; bits.len()];
        stream.read_f32_array(&mut out).unwrap();
        let decoded: Vec<u32> = out.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(decoded, bits);
        prop_assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn peeks_are_invisible_to_sequential_reads(
        bytes in proptest::collection::vec(any::<u8>(), 0..48),
        peeks in proptest::collection::vec(0usize..56, 0..48),
    ) {
        let mut plain = InputStream::new(&bytes);
        let mut expected = Vec::new();
        while let Ok(v) = plain.read_i16() {
            expected.push(v);
        }

        let mut mixed = InputStream::new(&bytes);
        let mut actual = Vec::new();
        let mut peeks = peeks.into_iter();
        loop {
            if let Some(at) = peeks.next() {
                let pos = mixed.position();
                let _ = mixed.read_i32_at(at);
                let _ = mixed.read_i8_at(at);
                prop_assert_eq!(mixed.position(), pos);
            }
            match mixed.read_i16() {
                Ok(v) => actual.push(v),
                Err(_) => break,
            }
        }

        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn special_floats_roundtrip() {
    let singles = [
        f32::NAN.to_bits(),
        0x7F80_0001, // signalling NaN
        0xFFC0_1234, // negative quiet NaN with payload
        f32::INFINITY.to_bits(),
        f32::NEG_INFINITY.to_bits(),
        (-0.0f32).to_bits(),
        f32::MIN_POSITIVE.to_bits(),
        1, // smallest subnormal
    ];
    let doubles = [
        f64::NAN.to_bits(),
        0x7FF0_0000_0000_0001,
        0xFFF8_DEAD_BEEF_0000,
        f64::INFINITY.to_bits(),
        f64::NEG_INFINITY.to_bits(),
        (-0.0f64).to_bits(),
        1,
    ];

    let mut writer = NativeWriter::new();
    for &b in &singles {
        writer = writer.f32_bits(b);
    }
    for &b in &doubles {
        writer = writer.f64_bits(b);
    }
    let bytes = writer.into_vec();
    let mut stream = InputStream::new(&bytes);

    for &b in &singles {
        assert_eq!(stream.read_f32().unwrap().to_bits(), b, "single {b:#010x}");
    }
    for &b in &doubles {
        assert_eq!(stream.read_f64().unwrap().to_bits(), b, "double {b:#018x}");
    }
    assert_eq!(stream.remaining(), 0);
}
