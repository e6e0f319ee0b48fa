use crate::memory::MemoryId;

/// The two failure categories a stream can report.
///
/// Mirrors [`StreamError`] without the diagnostic payload, so callers can
/// branch on the category without destructuring every field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An explicit position or length cap lies beyond the available bytes.
    OutOfRange,
    /// A read asked for more bytes than remain.
    InsufficientData,
}

/// Errors reported by [`InputStream`](crate::InputStream).
///
/// Every variant carries the identity of the backing memory plus the
/// numbers that made the operation fail. A failing operation never moves
/// the stream position and never writes into caller-provided storage.
///
/// ```text
///   StreamError
///   ├── OutOfRange        ← set_position / capped construction past the end
///   └── InsufficientData  ← sequential, absolute or array read past the end
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// A requested position or length exceeds the limit it is checked against.
    ///
    /// For a capped constructor `limit` is the memory's current length and
    /// `requested` the cap. For [`set_position`](crate::InputStream::set_position)
    /// `limit` is the stream length and `requested` the new position.
    #[error(
        "requested position or length {requested} is out of range for memory {memory} (limit {limit})"
    )]
    OutOfRange {
        memory: MemoryId,
        requested: usize,
        limit: usize,
    },

    /// Not enough bytes are left between the baseline position and the
    /// stream length.
    ///
    /// `requested` is the byte count that had to be available past `pos`.
    #[error(
        "not enough data in memory {memory}: len {len}, pos {pos}, requested {requested} bytes"
    )]
    InsufficientData {
        memory: MemoryId,
        len: usize,
        pos: usize,
        requested: usize,
    },
}

impl StreamError {
    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
        }
    }

    /// Identity of the memory the failing stream was bound to.
    #[must_use]
    pub fn memory(&self) -> MemoryId {
        match self {
            Self::OutOfRange { memory, .. } | Self::InsufficientData { memory, .. } => *memory,
        }
    }
}
