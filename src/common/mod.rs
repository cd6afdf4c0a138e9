//! Common types and utilities shared across format modules.
//!
//! This module provides primitive binary reads and the unified error type
//! used by every decoder layer, ensuring a consistent API for users.

// Submodule declarations
pub mod binary;
pub mod error;

// Re-exports for convenience
pub use binary::Endian;
pub use error::{Error, Result};
