//! Foundation types for the outliner.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCounter`] - Incremental line bookkeeping for single-pass scans
//! - [`SourceReader`], [`DecodedText`] - Reading and decoding source files
//!
//! This module has NO dependencies on other outliner modules apart from
//! the error types.

mod source;
mod span;

pub use source::{DecodedText, Encoding, FsSourceReader, SourceReader, content_hash, decode};
pub use span::{LineCounter, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
