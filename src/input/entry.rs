//! Lightweight descriptor of a byte range within a stream.

/// A named, typed byte range inside a specific stream.
///
/// Entries are plain value types copied freely; they never own stream data,
/// only describe where it lives. Resource-fork resources are addressed the
/// same way, with `kind` holding the 4-character type code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Offset of the first byte of the range
    pub begin: u64,
    /// Length of the range in bytes
    pub length: u64,
    /// Type tag of the range ("Text", "FrameDef", a resource type code, ...)
    pub kind: String,
    /// Numeric id of the range within its type
    pub id: i32,
}

impl Entry {
    /// Create a descriptor for `[begin, begin + length)`.
    pub fn new(begin: u64, length: u64) -> Self {
        Self {
            begin,
            length,
            kind: String::new(),
            id: 0,
        }
    }

    /// One past the last byte of the range.
    #[inline]
    pub fn end(&self) -> u64 {
        self.begin + self.length
    }

    /// An entry is usable once it describes at least one byte.
    #[inline]
    pub fn valid(&self) -> bool {
        self.length > 0
    }
}
