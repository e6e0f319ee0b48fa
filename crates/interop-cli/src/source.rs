/// Where a command reads its bytes from: a file, or hex given inline.
///
/// ```text
/// interop dump frame.bin --layout i32,i32
/// interop dump --hex "01 2a000000 000000" --layout bool,i32
/// ```
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Source {
    /// Binary file to read.
    pub file: Option<PathBuf>,

    /// Hex-encoded bytes instead of a file. Whitespace and a leading `0x`
    /// are ignored.
    #[arg(long)]
    pub hex: Option<String>,
}

impl Source {
    /// Load the whole source into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the hex is malformed.
    pub fn load(&self) -> Result<Vec<u8>> {
        if let Some(path) = &self.file {
            return fs::read(path).with_context(|| format!("cannot read {}", path.display()));
        }

        let text = self.hex.as_deref().unwrap_or_default();
        decode_hex(text)
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).with_context(|| format!("invalid hex input {text:?}"))
}
