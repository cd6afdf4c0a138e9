//! Unified error types for Quince operations.
use thiserror::Error;

/// Main error type for Quince operations.
///
/// A decode either runs to completion (possibly with per-zone diagnostics)
/// or fails at the very top with one of these variants.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not carry the expected signature
    #[error("Not a recognized zone-based document file")]
    NotZoneFile,

    /// Corrupted or malformed file
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// A compressed zone could not be inflated
    #[error("Decompression error: {0}")]
    Decompress(#[from] crate::compress::DecompressError),

    /// Parse error occurred
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for Quince operations.
pub type Result<T> = std::result::Result<T, Error>;
