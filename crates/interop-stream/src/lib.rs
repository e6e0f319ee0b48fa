#![warn(clippy::pedantic)]

//! Bounds-checked decoding of native-order binary data from memory that
//! belongs to someone else.
//!
//! ```
//! use interop_stream::InputStream;
//!
//! let mut mem = vec![0x01];
//! mem.extend_from_slice(&42i32.to_ne_bytes());
//!
//! let mut stream = InputStream::new(&mem);
//! assert!(stream.read_bool()?);
//! assert_eq!(stream.read_i32()?, 42);
//! assert!(stream.read_i8().is_err());
//! # Ok::<(), interop_stream::StreamError>(())
//! ```

pub mod error;
pub mod input_stream;
pub mod memory;

pub use error::{ErrorKind, StreamError};
pub use input_stream::InputStream;
pub use memory::{InteropMemory, MemoryId, SharedMemory};
