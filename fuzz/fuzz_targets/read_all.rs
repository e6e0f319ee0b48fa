#![no_main]

use interop_stream::InputStream;
use libfuzzer_sys::fuzz_target;

// Fuzz target: drain arbitrary bytes with every scalar width.
//
// The first byte picks the width rotation; the rest is the region. Reads
// must fail cleanly at the end instead of panicking, and the position must
// land exactly on the length when the widths fit.
fuzz_target!(|data: &[u8]| {
    let Some((&seed, region)) = data.split_first() else {
        return;
    };

    let mut stream = InputStream::new(region);
    let mut turn = usize::from(seed);
    loop {
        let res = match turn % 8 {
            0 => stream.read_i8().map(drop),
            1 => stream.read_bool().map(drop),
            2 => stream.read_i16().map(drop),
            3 => stream.read_u16().map(drop),
            4 => stream.read_i32().map(drop),
            5 => stream.read_i64().map(drop),
            6 => stream.read_f32().map(drop),
            _ => stream.read_f64().map(drop),
        };
        if res.is_err() {
            break;
        }
        turn += 1;
    }
    assert!(stream.position() <= stream.len());

    // Whatever is left still drains byte by byte.
    while stream.read_i8().is_ok() {}
    assert_eq!(stream.remaining(), 0);
});
