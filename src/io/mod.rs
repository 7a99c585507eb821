//! Byte sources a document can be decoded from.
//!
//! A source is random-access so the loader can open it twice: once to sniff
//! the encoding from a prefix and once to stream the full decode.

mod adapter;
mod byte_source;

pub use adapter::ByteSourceCursor;
pub use byte_source::{ByteSource, FileSource, MemorySource};
