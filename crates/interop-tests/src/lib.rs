//! Fixture helpers shared by the integration tests and benches.
//!
//! [`NativeWriter`] lays values out exactly the way the stream expects to
//! find them: native byte order, no padding, no length prefixes.

use bytes::{BufMut, Bytes, BytesMut};

/// Append-only builder for native-order fixtures.
#[derive(Debug, Default)]
pub struct NativeWriter {
    buf: BytesMut,
}

impl NativeWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn i8(mut self, v: i8) -> Self {
        self.buf.put_i8(v);
        self
    }

    #[must_use]
    pub fn bool(self, v: bool) -> Self {
        self.i8(i8::from(v))
    }

    #[must_use]
    pub fn i16(mut self, v: i16) -> Self {
        self.buf.put_i16_ne(v);
        self
    }

    #[must_use]
    pub fn u16(mut self, v: u16) -> Self {
        self.buf.put_u16_ne(v);
        self
    }

    #[must_use]
    pub fn i32(mut self, v: i32) -> Self {
        self.buf.put_i32_ne(v);
        self
    }

    #[must_use]
    pub fn i64(mut self, v: i64) -> Self {
        self.buf.put_i64_ne(v);
        self
    }

    /// Write a single given as its raw bit pattern.
    #[must_use]
    pub fn f32_bits(mut self, bits: u32) -> Self {
        self.buf.put_u32_ne(bits);
        self
    }

    /// Write a double given as its raw bit pattern.
    #[must_use]
    pub fn f64_bits(mut self, bits: u64) -> Self {
        self.buf.put_u64_ne(bits);
        self
    }

    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.put_slice(bytes);
        self
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    #[must_use]
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// The 8-byte region `[true][42i32][0, 0, 0]`.
#[must_use]
pub fn bool_and_int() -> Vec<u8> {
    NativeWriter::new().bool(true).i32(42).raw(&[0, 0, 0]).into_vec()
}
