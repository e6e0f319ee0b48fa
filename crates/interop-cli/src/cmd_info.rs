/// Implementation of `interop info`.
///
/// Prints the identity and length of the loaded memory followed by a hex
/// dump of its first bytes.
///
/// ```text
/// Memory: 0x55d0c1a2b3c0, 8 bytes
/// 00000000  01 2a 00 00 00 00 00 00                          |.*......|
/// ```
use anyhow::Result;
use interop_stream::{InputStream, InteropMemory};

use crate::InfoArgs;

/// Run the `interop info` command.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded.
pub fn run(args: &InfoArgs) -> Result<()> {
    let mem = args.source.load()?;
    let mut stream = InputStream::new(&mem);

    println!("Memory: {}, {} bytes", mem.id(), stream.len());

    let shown = stream.len().min(args.limit);
    let bytes = stream.read_slice(shown)?;
    for line in hex_dump(bytes) {
        println!("{line}");
    }
    if shown < mem.len() {
        println!("... {} more bytes", mem.len() - shown);
    }

    Ok(())
}

/// Format `bytes` as 16-byte lines: offset, hex columns, printable ASCII.
pub fn hex_dump(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{:08x}  {:<47}  |{ascii}|", i * 16, hex.join(" "))
        })
        .collect()
}
