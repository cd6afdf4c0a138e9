//! Bounded input streams and byte-range descriptors.
//!
//! Everything in the decoder reads through [`BoundedStream`], a seekable
//! cursor over a shared byte buffer with a LIFO stack of section limits.
//! [`Entry`] is the universal "this range of bytes is X" descriptor passed
//! between components instead of raw offsets.

// Submodule declarations
mod entry;
mod stream;

// Re-exports
pub use entry::Entry;
pub use stream::{BoundedStream, SeekWhence};
