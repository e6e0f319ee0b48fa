use std::fmt;
use std::mem::{size_of, size_of_val};

use tracing::{debug, trace, warn};
use zerocopy::{FromBytes, IntoBytes};

use crate::error::StreamError;
use crate::memory::InteropMemory;

/// Bounds-checked decoding cursor over an externally owned memory region.
///
/// The stream caches a snapshot of the region (data and length) and keeps
/// its own read position. Sequential reads consume bytes at the position
/// and advance it; the `*_at` reads decode at an absolute offset and leave
/// the position alone.
///
/// ```text
///   0                 pos                 len          region length
///   ├──── consumed ────┼──── remaining ────┤ (cap) ──────┤
///                      └─ read_i32() ─┘
///        └─ read_i32_at(2) ─┘            (no advance)
/// ```
///
/// Values are decoded in native byte order with a raw bit copy: no numeric
/// conversion happens, so floats come back with the exact bit pattern that
/// was written (NaN payloads and negative zero included).
///
/// The snapshot goes stale when the region is reallocated or grows. The
/// stream never notices on its own; call [`synchronize`](Self::synchronize)
/// after the writer hands the region back.
///
/// Every failing operation leaves the position, the length and any caller
/// output buffer untouched.
pub struct InputStream<'m, M: InteropMemory + ?Sized + 'm> {
    mem: &'m M,
    data: M::Data<'m>,
    len: usize,
    pos: usize,
}

impl<'m, M: InteropMemory + ?Sized + 'm> InputStream<'m, M> {
    /// Bind a stream to the full current length of `mem`, positioned at 0.
    #[must_use]
    pub fn new(mem: &'m M) -> Self {
        let data = mem.data();
        let len = data.len();
        Self {
            mem,
            data,
            len,
            pos: 0,
        }
    }

    /// Bind a stream to the first `len` bytes of `mem`, positioned at 0.
    ///
    /// # Errors
    ///
    /// [`StreamError::OutOfRange`] if `len` is greater than the memory's
    /// current length.
    pub fn with_len(mem: &'m M, len: usize) -> Result<Self, StreamError> {
        let data = mem.data();
        if len > data.len() {
            let memory = mem.id();
            let limit = data.len();
            debug!(%memory, requested = len, limit, "requested stream length exceeds memory length");
            return Err(StreamError::OutOfRange {
                memory,
                requested: len,
                limit,
            });
        }

        Ok(Self {
            mem,
            data,
            len,
            pos: 0,
        })
    }

    /// The memory this stream reads from.
    #[must_use]
    pub fn memory(&self) -> &'m M {
        self.mem
    }

    /// Usable length as of construction or the last `synchronize`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current read offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the position and the length.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.pos)
    }

    /// Move the read offset to `pos`. Rewinding is allowed.
    ///
    /// # Errors
    ///
    /// [`StreamError::OutOfRange`] if `pos` is past the stream length.
    pub fn set_position(&mut self, pos: usize) -> Result<(), StreamError> {
        if pos > self.len {
            let memory = self.mem.id();
            debug!(%memory, len = self.len, requested = pos, "requested stream position is out of bounds");
            return Err(StreamError::OutOfRange {
                memory,
                requested: pos,
                limit: self.len,
            });
        }

        self.pos = pos;
        Ok(())
    }

    /// Advance the position by `count` bytes without decoding them.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than `count` bytes remain.
    pub fn skip(&mut self, count: usize) -> Result<(), StreamError> {
        self.ensure(count)?;
        self.pos += count;
        Ok(())
    }

    /// Advance the position by `count` bytes without any bounds check.
    ///
    /// The position may end up past the length. Nothing is read out of
    /// bounds because of it: every later read reports
    /// [`StreamError::InsufficientData`] until the position is moved back
    /// with [`set_position`](Self::set_position).
    pub fn skip_unchecked(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count);
    }

    /// Re-read data and length from the live memory.
    ///
    /// Replaces the cached snapshot unconditionally, which also drops a
    /// length cap given to [`with_len`](Self::with_len). The position is
    /// kept as is.
    pub fn synchronize(&mut self) {
        let data = self.mem.data();
        let len = data.len();

        if self.pos > len {
            warn!(
                memory = %self.mem.id(),
                len,
                pos = self.pos,
                "memory is shorter than the stream position after synchronize"
            );
        }
        trace!(memory = %self.mem.id(), old_len = self.len, new_len = len, "stream synchronized");

        self.data = data;
        self.len = len;
    }

    // ── Sequential reads ─────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if no byte remains.
    pub fn read_i8(&mut self) -> Result<i8, StreamError> {
        self.read()
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than 2 bytes remain.
    pub fn read_i16(&mut self) -> Result<i16, StreamError> {
        self.read()
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16, StreamError> {
        self.read()
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32, StreamError> {
        self.read()
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than 8 bytes remain.
    pub fn read_i64(&mut self) -> Result<i64, StreamError> {
        self.read()
    }

    /// Read one byte as a boolean: `1` is `true`, every other value is `false`.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if no byte remains.
    pub fn read_bool(&mut self) -> Result<bool, StreamError> {
        Ok(self.read_i8()? == 1)
    }

    /// Read 4 bytes and reinterpret them as an IEEE-754 single.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_bits(self.read::<u32>()?))
    }

    /// Read 8 bytes and reinterpret them as an IEEE-754 double.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64, StreamError> {
        Ok(f64::from_bits(self.read::<u64>()?))
    }

    /// Borrow the next `count` bytes and advance past them.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if fewer than `count` bytes remain.
    pub fn read_slice(&mut self, count: usize) -> Result<&[u8], StreamError> {
        self.ensure(count)?;
        let start = self.pos;
        self.pos += count;
        Ok(&self.data[start..self.pos])
    }

    // ── Absolute-offset reads ────────────────────────────────────────────
    //
    // Bytes that end at or before the position were already available when
    // the position moved past them, so only the part past the position is
    // checked against the length.

    /// Read the byte at `offset` without moving the position.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `offset` is at or past the length.
    pub fn read_i8_at(&self, offset: usize) -> Result<i8, StreamError> {
        self.read_at(offset)
    }

    /// Read 2 bytes at `offset` without moving the position.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `offset + 2` is past the length.
    pub fn read_i16_at(&self, offset: usize) -> Result<i16, StreamError> {
        self.read_at(offset)
    }

    /// Read 4 bytes at `offset` without moving the position.
    ///
    /// Typically used to read back a length field that was patched in after
    /// the data behind it was written.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `offset + 4` is past the length.
    pub fn read_i32_at(&self, offset: usize) -> Result<i32, StreamError> {
        self.read_at(offset)
    }

    // ── Array reads ──────────────────────────────────────────────────────
    //
    // `out.len()` is the element count. The span is checked as a whole
    // before anything is copied.

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `out.len()` bytes do not remain.
    pub fn read_i8_array(&mut self, out: &mut [i8]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    /// Read `out.len()` single-byte booleans with the [`read_bool`](Self::read_bool) rule.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `out.len()` bytes do not remain.
    pub fn read_bool_array(&mut self, out: &mut [bool]) -> Result<(), StreamError> {
        self.ensure(out.len())?;
        for slot in out.iter_mut() {
            *slot = self.read_bool()?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `2 * out.len()` bytes do not remain.
    pub fn read_i16_array(&mut self, out: &mut [i16]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `2 * out.len()` bytes do not remain.
    pub fn read_u16_array(&mut self, out: &mut [u16]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `4 * out.len()` bytes do not remain.
    pub fn read_i32_array(&mut self, out: &mut [i32]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `8 * out.len()` bytes do not remain.
    pub fn read_i64_array(&mut self, out: &mut [i64]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    /// Copy `out.len()` singles verbatim, preserving every bit pattern.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `4 * out.len()` bytes do not remain.
    pub fn read_f32_array(&mut self, out: &mut [f32]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    /// Copy `out.len()` doubles verbatim, preserving every bit pattern.
    ///
    /// # Errors
    ///
    /// [`StreamError::InsufficientData`] if `8 * out.len()` bytes do not remain.
    pub fn read_f64_array(&mut self, out: &mut [f64]) -> Result<(), StreamError> {
        self.read_array(out)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn read<T: FromBytes>(&mut self) -> Result<T, StreamError> {
        let width = size_of::<T>();
        self.ensure(width)?;
        // The width was checked above, so a size mismatch cannot happen here.
        let value = T::read_from_bytes(&self.data[self.pos..self.pos + width])
            .map_err(|_| self.short_read(self.pos, width))?;
        self.pos += width;
        Ok(value)
    }

    fn read_at<T: FromBytes>(&self, offset: usize) -> Result<T, StreamError> {
        let width = size_of::<T>();
        // A position left past the length by skip_unchecked must not let
        // reads behind it escape the length.
        let base = self.pos.min(self.len);
        let end = offset
            .checked_add(width)
            .ok_or_else(|| self.insufficient(base, usize::MAX))?;

        if end > base {
            self.ensure_from(base, end - base)?;
        }

        T::read_from_bytes(&self.data[offset..end]).map_err(|_| self.short_read(base, width))
    }

    fn read_array<T: FromBytes + IntoBytes>(&mut self, out: &mut [T]) -> Result<(), StreamError> {
        let span = size_of_val(out);
        self.ensure(span)?;
        out.as_mut_bytes()
            .copy_from_slice(&self.data[self.pos..self.pos + span]);
        self.pos += span;
        Ok(())
    }

    fn ensure(&self, count: usize) -> Result<(), StreamError> {
        self.ensure_from(self.pos, count)
    }

    fn ensure_from(&self, base: usize, count: usize) -> Result<(), StreamError> {
        if base <= self.len && self.len - base >= count {
            Ok(())
        } else {
            Err(self.insufficient(base, count))
        }
    }

    fn insufficient(&self, pos: usize, requested: usize) -> StreamError {
        debug!(
            memory = %self.mem.id(),
            len = self.len,
            pos,
            requested,
            "not enough data in the stream"
        );
        self.short_read(pos, requested)
    }

    /// Build the error without logging it.
    fn short_read(&self, pos: usize, requested: usize) -> StreamError {
        StreamError::InsufficientData {
            memory: self.mem.id(),
            len: self.len,
            pos,
            requested,
        }
    }
}

impl<'m, M> Clone for InputStream<'m, M>
where
    M: InteropMemory + ?Sized + 'm,
    M::Data<'m>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            mem: self.mem,
            data: self.data.clone(),
            len: self.len,
            pos: self.pos,
        }
    }
}

impl<'m, M: InteropMemory + ?Sized + 'm> fmt::Debug for InputStream<'m, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStream")
            .field("memory", &self.mem.id())
            .field("len", &self.len)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}
