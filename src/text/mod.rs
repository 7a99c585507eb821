//! Decoded document text and the loader that produces it.
//!
//! All positions exposed by this crate are character offsets into a
//! [`DecodedText`], never byte offsets.

mod decoded;
mod loader;

pub use decoded::DecodedText;
pub use loader::{LoadConfig, LoadedText, TextLoader};
