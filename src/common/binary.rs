//! Binary data parsing utilities shared across format modules.
//!
//! This module provides common functions for reading primitive integers out
//! of byte slices and for decoding MacRoman strings. Classic Mac formats are
//! big-endian on disk, but every read takes an explicit [`Endian`] so that
//! the rare little-endian field can be decoded through the same helpers.

use zerocopy::{BE, FromBytes, LE, U16, U32};

/// Byte order of an on-disk integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Big-endian (the native order of the classic Mac format family)
    Big,
    /// Little-endian
    Little,
}

/// Read a u16 from a byte slice at the given offset.
///
/// Returns `None` when fewer than two bytes are available; malformed input
/// is a caller-policy decision, never a panic.
#[inline]
pub fn read_u16(data: &[u8], offset: usize, endian: Endian) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    match endian {
        Endian::Big => U16::<BE>::read_from_bytes(bytes).ok().map(|v| v.get()),
        Endian::Little => U16::<LE>::read_from_bytes(bytes).ok().map(|v| v.get()),
    }
}

/// Read an i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16(data: &[u8], offset: usize, endian: Endian) -> Option<i16> {
    read_u16(data, offset, endian).map(|v| v as i16)
}

/// Read a u32 from a byte slice at the given offset.
#[inline]
pub fn read_u32(data: &[u8], offset: usize, endian: Endian) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    match endian {
        Endian::Big => U32::<BE>::read_from_bytes(bytes).ok().map(|v| v.get()),
        Endian::Little => U32::<LE>::read_from_bytes(bytes).ok().map(|v| v.get()),
    }
}

/// Read an i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32(data: &[u8], offset: usize, endian: Endian) -> Option<i32> {
    read_u32(data, offset, endian).map(|v| v as i32)
}

/// Decode a MacRoman byte sequence into a `String`.
///
/// Every byte value is a valid MacRoman character, so this never fails;
/// unusual control bytes come through as-is.
pub fn decode_mac_roman(data: &[u8]) -> String {
    let (decoded, _) = encoding_rs::MACINTOSH.decode_without_bom_handling(data);
    decoded.into_owned()
}
