//! Unified error types for the Quince library.
//!
//! Per-zone failures are deliberately *not* part of this module: structural
//! readers report them as boolean results plus diagnostics and the decode
//! continues. Only document-level failures surface as [`Error`].

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
