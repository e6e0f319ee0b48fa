use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Bytes, BytesMut};

/// Opaque identity of a backing memory region.
///
/// Only used for diagnostics: it shows up in every [`StreamError`] and in
/// the structured fields of the failure events. Rendered as lowercase hex
/// with a `0x` prefix, the way a raw memory address would be.
///
/// [`StreamError`]: crate::StreamError
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryId(u64);

impl MemoryId {
    /// Wrap a raw identity value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Identity derived from the address of the first byte of a region.
    #[must_use]
    pub fn from_ptr(ptr: *const u8) -> Self {
        Self(ptr as usize as u64)
    }

    /// The underlying value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A contiguous byte region owned by someone other than the stream.
///
/// The stream never allocates, grows or frees a region. It takes a
/// snapshot through [`data`](Self::data) when it is created and again on
/// every [`synchronize`](crate::InputStream::synchronize) call, and reads
/// only from that snapshot in between.
///
/// The snapshot handle is an associated type so plain slices hand out a
/// borrow (zero-copy) while regions that can be reallocated under a shared
/// reference hand out something that keeps the old allocation alive.
///
/// ```text
/// ┌──────────────┬───────────────┬──────────────────────────────────┐
/// │ Region       │ Data<'a>      │ Changes while borrowed?          │
/// ├──────────────┼───────────────┼──────────────────────────────────┤
/// │ [u8]         │ &'a [u8]      │ no                               │
/// │ Vec<u8>      │ &'a [u8]      │ no                               │
/// │ Bytes        │ Bytes         │ no                               │
/// │ SharedMemory │ Bytes         │ yes, grows through append()      │
/// └──────────────┴───────────────┴──────────────────────────────────┘
/// ```
pub trait InteropMemory {
    /// Snapshot of the region's current contents.
    type Data<'a>: Deref<Target = [u8]>
    where
        Self: 'a;

    /// Take a snapshot of the bytes currently valid in the region.
    ///
    /// The snapshot's length is the region's current length.
    fn data(&self) -> Self::Data<'_>;

    /// Identity used in diagnostics.
    fn id(&self) -> MemoryId;

    /// Number of valid bytes currently in the region.
    fn len(&self) -> usize {
        self.data().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InteropMemory for [u8] {
    type Data<'a> = &'a [u8];

    fn data(&self) -> Self::Data<'_> {
        self
    }

    fn id(&self) -> MemoryId {
        MemoryId::from_ptr(self.as_ptr())
    }
}

impl InteropMemory for Vec<u8> {
    type Data<'a> = &'a [u8];

    fn data(&self) -> Self::Data<'_> {
        self.as_slice()
    }

    fn id(&self) -> MemoryId {
        MemoryId::from_ptr(self.as_ptr())
    }
}

impl InteropMemory for Bytes {
    type Data<'a> = Bytes;

    fn data(&self) -> Self::Data<'_> {
        self.clone()
    }

    fn id(&self) -> MemoryId {
        MemoryId::from_ptr(self.as_ptr())
    }
}

static NEXT_SHARED_ID: AtomicU64 = AtomicU64::new(1);

/// A growable region that a writer extends while readers hold it.
///
/// Stands in for memory that a peer fills in: the writer calls
/// [`append`](Self::append) through a shared reference, which publishes a
/// fresh allocation holding the old contents plus the new bytes. Snapshots
/// taken before the append keep pointing at the old allocation, so a stream
/// bound to this region sees the new bytes only after it resynchronizes.
///
/// The region only ever grows. It is single-threaded (`!Sync`); handing it
/// to another thread is not supported.
///
/// The identity is assigned from a process-wide counter at construction and
/// survives every reallocation.
#[derive(Debug)]
pub struct SharedMemory {
    id: MemoryId,
    buf: RefCell<Bytes>,
}

impl SharedMemory {
    /// Create an empty region.
    #[must_use]
    pub fn new() -> Self {
        Self::from_bytes(Bytes::new())
    }

    fn from_bytes(buf: Bytes) -> Self {
        Self {
            id: MemoryId::new(NEXT_SHARED_ID.fetch_add(1, Ordering::Relaxed)),
            buf: RefCell::new(buf),
        }
    }

    /// Append `bytes` to the end of the region.
    ///
    /// Always reallocates: streams bound to this region keep reading their
    /// previous snapshot until they call `synchronize`.
    pub fn append(&self, bytes: &[u8]) {
        let mut buf = self.buf.borrow_mut();
        let mut next = BytesMut::with_capacity(buf.len() + bytes.len());
        next.extend_from_slice(&buf);
        next.extend_from_slice(bytes);
        *buf = next.freeze();
    }
}

impl Default for SharedMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for SharedMemory {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for SharedMemory {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(bytes))
    }
}

impl InteropMemory for SharedMemory {
    type Data<'a> = Bytes;

    fn data(&self) -> Self::Data<'_> {
        self.buf.borrow().clone()
    }

    fn id(&self) -> MemoryId {
        self.id
    }
}
