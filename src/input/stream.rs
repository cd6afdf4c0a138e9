//! Seekable byte reader with a stack of scoped section limits.

use bytes::Bytes;
use smallvec::SmallVec;

use crate::common::binary::{self, Endian};

/// Reference point for [`BoundedStream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// From the start of the stream
    Set,
    /// From the current position
    Cur,
    /// From the current limit
    End,
}

/// A seekable reader over a shared byte buffer, with push/pop of temporary
/// section limits.
///
/// The cursor can never move outside `[0, limit]` and no read crosses the
/// active limit. Limits form a strict LIFO stack: a structural reader pushes
/// the end of its record before descending into nested fields and pops it on
/// the way out, so a malformed inner length can never leak reads into the
/// next record.
///
/// Every method that can fail on malformed input returns `bool`/`Option`
/// rather than an error: callers treat failure as "this zone is corrupt,
/// abandon it, continue with the next".
#[derive(Debug, Clone)]
pub struct BoundedStream {
    data: Bytes,
    pos: u64,
    limits: SmallVec<[u64; 4]>,
}

impl BoundedStream {
    /// Create a stream over the given buffer, cursor at 0, no limit pushed.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            pos: 0,
            limits: SmallVec::new(),
        }
    }

    /// Total size of the underlying buffer in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the underlying buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The currently active limit: the innermost pushed limit, or the
    /// underlying size when the stack is empty.
    #[inline]
    pub fn limit(&self) -> u64 {
        self.limits.last().copied().unwrap_or_else(|| self.len())
    }

    /// Current cursor position.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// True once the cursor has reached the active limit.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.limit()
    }

    /// Bounds check without mutating the cursor.
    ///
    /// Must be called before every forward seek whose target came from
    /// untrusted file data.
    #[inline]
    pub fn check_position(&self, pos: u64) -> bool {
        pos <= self.limit()
    }

    /// Move the cursor. The target is clamped to `[0, limit]`; returns
    /// whether the requested position was reachable without clamping.
    pub fn seek(&mut self, offset: i64, whence: SeekWhence) -> bool {
        let base = match whence {
            SeekWhence::Set => 0i64,
            SeekWhence::Cur => self.pos as i64,
            SeekWhence::End => self.limit() as i64,
        };
        let target = base.saturating_add(offset);
        let clamped = target.clamp(0, self.limit() as i64);
        self.pos = clamped as u64;
        target == clamped
    }

    /// Push a new section limit, clamped to the underlying size. The cursor
    /// is pulled back if it already sits past the new limit.
    pub fn push_limit(&mut self, limit: u64) {
        let clamped = limit.min(self.len());
        self.limits.push(clamped);
        if self.pos > clamped {
            self.pos = clamped;
        }
    }

    /// Pop the innermost section limit, restoring the previous one (or the
    /// underlying size if the stack becomes empty).
    pub fn pop_limit(&mut self) {
        self.limits.pop();
    }

    /// Read one byte, or `None` at the limit.
    pub fn read_u8(&mut self) -> Option<u8> {
        if self.pos >= self.limit() {
            return None;
        }
        let byte = self.data[self.pos as usize];
        self.pos += 1;
        Some(byte)
    }

    /// Read an i8 with two's-complement interpretation.
    pub fn read_i8(&mut self) -> Option<i8> {
        self.read_u8().map(|v| v as i8)
    }

    /// Read a u16 in the given byte order.
    pub fn read_u16(&mut self, endian: Endian) -> Option<u16> {
        if self.pos + 2 > self.limit() {
            return None;
        }
        let value = binary::read_u16(&self.data, self.pos as usize, endian)?;
        self.pos += 2;
        Some(value)
    }

    /// Read an i16 in the given byte order.
    pub fn read_i16(&mut self, endian: Endian) -> Option<i16> {
        self.read_u16(endian).map(|v| v as i16)
    }

    /// Read a u32 in the given byte order.
    pub fn read_u32(&mut self, endian: Endian) -> Option<u32> {
        if self.pos + 4 > self.limit() {
            return None;
        }
        let value = binary::read_u32(&self.data, self.pos as usize, endian)?;
        self.pos += 4;
        Some(value)
    }

    /// Read an i32 in the given byte order.
    pub fn read_i32(&mut self, endian: Endian) -> Option<i32> {
        self.read_u32(endian).map(|v| v as i32)
    }

    /// Bulk read of `size` bytes as a zero-copy slice, honoring the active
    /// limit. Fails without moving the cursor if the block would cross it.
    pub fn read_data(&mut self, size: u64) -> Option<Bytes> {
        if size > self.limit() - self.pos {
            return None;
        }
        let start = self.pos as usize;
        let block = self.data.slice(start..start + size as usize);
        self.pos += size;
        Some(block)
    }

    /// Read a 1-byte length-prefixed MacRoman string.
    ///
    /// Rejects lengths above `max_len` (corrupt length bytes) and lengths
    /// that would cross the active limit. The length byte is consumed either
    /// way; callers resynchronize by reseeking to a fixed record boundary.
    pub fn read_pascal_string(&mut self, max_len: u8) -> Option<String> {
        let len = self.read_u8()?;
        if len > max_len {
            return None;
        }
        let bytes = self.read_data(u64::from(len))?;
        Some(binary::decode_mac_roman(&bytes))
    }

    /// Zero-copy slice of `[begin, begin + length)` against the underlying
    /// buffer, independent of cursor and limits.
    pub fn slice(&self, begin: u64, length: u64) -> Option<Bytes> {
        let end = begin.checked_add(length)?;
        if end > self.len() {
            return None;
        }
        Some(self.data.slice(begin as usize..end as usize))
    }
}

impl From<Vec<u8>> for BoundedStream {
    fn from(data: Vec<u8>) -> Self {
        Self::new(Bytes::from(data))
    }
}

impl From<&[u8]> for BoundedStream {
    fn from(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }
}
