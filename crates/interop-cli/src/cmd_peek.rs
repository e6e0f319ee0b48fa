/// Implementation of `interop peek`.
///
/// Reads one value at an absolute offset without consuming anything. With
/// `--position` the stream is first moved to that position, which changes
/// the baseline the availability check starts from: bytes behind the
/// position are not checked again.
///
/// ```text
/// i32 @ 4 = 0 (position 0)
/// ```
use anyhow::{Context, Result};
use interop_stream::{InputStream, InteropMemory, StreamError};

use crate::{PeekArgs, PeekWidth};

/// Run the `interop peek` command.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded, `--position` is out of
/// range, or the value at `--at` is not available.
pub fn run(args: &PeekArgs) -> Result<()> {
    let mem = args.source.load()?;
    let mut stream = InputStream::new(&mem);
    if let Some(pos) = args.position {
        stream.set_position(pos).context("invalid --position")?;
    }

    let (label, value) = peek(&stream, args.width, args.at)?;

    println!("{label} @ {} = {value} (position {})", args.at, stream.position());
    Ok(())
}

fn peek<M: InteropMemory + ?Sized>(
    stream: &InputStream<'_, M>,
    width: PeekWidth,
    at: usize,
) -> Result<(&'static str, i32), StreamError> {
    Ok(match width {
        PeekWidth::One => ("i8", i32::from(stream.read_i8_at(at)?)),
        PeekWidth::Two => ("i16", i32::from(stream.read_i16_at(at)?)),
        PeekWidth::Four => ("i32", stream.read_i32_at(at)?),
    })
}
