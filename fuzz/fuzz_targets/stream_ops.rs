#![no_main]

use arbitrary::Arbitrary;
use interop_stream::{InputStream, SharedMemory};
use libfuzzer_sys::fuzz_target;

// Fuzz target: arbitrary operation sequences against a growing region.
//
// Catches bugs in:
// - absolute reads with offsets near usize::MAX (overflow on offset + width)
// - array reads whose span exceeds what remains
// - positions left past the length by skip_unchecked
// - synchronize after the writer appended more bytes
#[derive(Arbitrary, Debug)]
enum Op {
    I8,
    I32,
    F64,
    I8At(usize),
    I16At(usize),
    I32At(usize),
    I16Array(u8),
    BoolArray(u8),
    Slice(u16),
    SetPosition(usize),
    Skip(usize),
    SkipUnchecked(usize),
    Append(Vec<u8>),
    Synchronize,
}

#[derive(Arbitrary, Debug)]
struct Input {
    initial: Vec<u8>,
    cap: Option<usize>,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mem = SharedMemory::from(input.initial);
    let mut stream = match input.cap {
        Some(cap) => match InputStream::with_len(&mem, cap) {
            Ok(stream) => stream,
            Err(_) => return,
        },
        None => InputStream::new(&mem),
    };
    let mut unchecked = false;

    for op in input.ops {
        let pos = stream.position();
        let res = match op {
            Op::I8 => stream.read_i8().map(drop),
            Op::I32 => stream.read_i32().map(drop),
            Op::F64 => stream.read_f64().map(drop),
            Op::I8At(at) => stream.read_i8_at(at).map(drop),
            Op::I16At(at) => stream.read_i16_at(at).map(drop),
            Op::I32At(at) => stream.read_i32_at(at).map(drop),
            Op::I16Array(n) => stream.read_i16_array(&mut vec![0; usize::from(n)]),
            Op::BoolArray(n) => stream.read_bool_array(&mut vec![false; usize::from(n)]),
            Op::Slice(n) => stream.read_slice(usize::from(n)).map(drop),
            Op::SetPosition(p) => {
                let res = stream.set_position(p);
                if res.is_ok() {
                    unchecked = false;
                }
                res
            }
            Op::Skip(n) => stream.skip(n),
            Op::SkipUnchecked(n) => {
                stream.skip_unchecked(n);
                unchecked = true;
                Ok(())
            }
            Op::Append(bytes) => {
                mem.append(&bytes);
                Ok(())
            }
            Op::Synchronize => {
                stream.synchronize();
                Ok(())
            }
        };

        if res.is_err() {
            assert_eq!(stream.position(), pos);
        }
        if !unchecked {
            assert!(stream.position() <= stream.len());
        }
    }
});
