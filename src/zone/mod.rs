//! Zones: named, typed, position-addressed regions of a document file.
//!
//! A zone is the atomic unit of decoding. The walker reads a chained list of
//! zone-descriptor tables into a [`ZoneTable`]; the dispatcher in
//! [`dispatch`] then materializes each zone's bytes (inflating compressed
//! zones) and routes them to the structural reader registered for the zone's
//! type tag.
//!
//! On-disk layout (big-endian):
//!
//! ```text
//! table header (10 bytes): count u8, reserved u8, self_ptr u32, next_ptr u32
//! row (16 bytes): kind_tag u8, reserved u8, begin u32, id u16, sub_id u16, 6 reserved
//! zone header (12 bytes at begin): total_len u32, uncompressed_len u32,
//!                                  flags u16 (bit 0 = compressed), reserved u16
//! ```

pub mod dispatch;

use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;
use bytes::Bytes;
use zerocopy::{BE, FromBytes, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

use crate::diag::Diagnostics;
use crate::input::{BoundedStream, Entry, SeekWhence};

/// Size of one zone-table header in bytes.
pub const TABLE_HEADER_SIZE: u64 = 10;
/// Size of one zone-table row in bytes.
pub const TABLE_ROW_SIZE: u64 = 16;

/// Raw zone-table row structure (16 bytes), as stored on disk.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawZoneRow {
    /// Dispatch tag selecting the structural reader
    kind_tag: u8,
    /// Reserved, always zero in observed files
    reserved: u8,
    /// File offset of the zone's own header
    begin: U32<BE>,
    /// Declared zone id (not required to be unique)
    id: U16<BE>,
    /// Sub-id distinguishing sibling zones of one id
    sub_id: U16<BE>,
    /// Reserved padding
    padding: [u8; 6],
}

/// Raw zone own-header structure (12 bytes), as stored on disk.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawZoneHeader {
    total_len: U32<BE>,
    uncompressed_len: U32<BE>,
    flags: U16<BE>,
    reserved: U16<BE>,
}

bitflags! {
    /// Flag word of a zone's own header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ZoneFlags: u16 {
        /// Zone payload is splay-compressed
        const COMPRESSED = 0x0001;
    }
}

/// Decoded zone own-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneHeader {
    /// Declared total length of the zone, header included
    pub total_len: u32,
    /// Declared size of the payload once decompressed
    pub uncompressed_len: u32,
    /// Flag word
    pub flags: ZoneFlags,
}

impl ZoneHeader {
    /// On-disk size of the header.
    pub const SIZE: u64 = 12;

    /// Read a zone header at the stream's current position.
    pub fn read(stream: &mut BoundedStream) -> Option<Self> {
        let raw = stream.read_data(Self::SIZE)?;
        let raw = RawZoneHeader::read_from_bytes(&raw).ok()?;
        Some(Self {
            total_len: raw.total_len.get(),
            uncompressed_len: raw.uncompressed_len.get(),
            flags: ZoneFlags::from_bits_retain(raw.flags.get()),
        })
    }

    /// Whether the payload must be run through the splay decoder.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags.contains(ZoneFlags::COMPRESSED)
    }
}

/// Where a zone's decoded bytes live.
///
/// Uncompressed zones view the original stream; compressed zones own their
/// inflated buffer. [`Zone::input`] hides the distinction from readers.
#[derive(Debug, Clone)]
pub enum ZoneSource {
    /// Zero-copy view of the file at `[begin + header, end)`
    Sliced(Bytes),
    /// Owned decompressed buffer
    Owned(Bytes),
}

/// One zone descriptor plus, once materialized, its decoded bytes.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Byte range of the zone within the main stream (length is filled in
    /// from the zone's own header when the zone is processed)
    pub entry: Entry,
    /// Dispatch tag from the zone-table row
    pub kind_tag: u8,
    /// Declared id
    pub id: u16,
    /// Declared sub-id
    pub sub_id: u16,
    /// Flag word, filled in when the zone is processed
    pub flags: ZoneFlags,
    /// Whether a structural reader has successfully consumed this zone
    pub parsed: bool,
    source: Option<ZoneSource>,
}

impl Zone {
    /// Descriptor for a zone whose header has not been read yet.
    pub fn new(kind_tag: u8, id: u16, sub_id: u16, begin: u64) -> Self {
        Self {
            entry: Entry::new(begin, 0),
            kind_tag,
            id,
            sub_id,
            flags: ZoneFlags::empty(),
            parsed: false,
            source: None,
        }
    }

    /// A private stream over the zone's decoded payload, offsets starting
    /// at 0. `None` until the dispatcher has materialized the zone.
    pub fn input(&self) -> Option<BoundedStream> {
        match &self.source {
            Some(ZoneSource::Sliced(bytes)) | Some(ZoneSource::Owned(bytes)) => {
                Some(BoundedStream::new(bytes.clone()))
            }
            None => None,
        }
    }

    pub(crate) fn set_source(&mut self, source: ZoneSource) {
        self.source = Some(source);
    }
}

/// The ordered set of zone descriptors found in a file.
///
/// Ids are not required to be unique: every valid row is kept in read order
/// for processing, while id lookup resolves to the first occurrence and
/// later collisions are logged.
#[derive(Debug, Default)]
pub struct ZoneTable {
    zones: Vec<Zone>,
    by_id: BTreeMap<u16, usize>,
}

impl ZoneTable {
    /// Walk the chained zone tables starting at `start`.
    ///
    /// Malformed tables degrade gracefully: a cyclic next-pointer, a bad
    /// self-pointer or an unreadable header stops the walk with whatever has
    /// been collected, and a single out-of-bounds row is skipped without
    /// aborting its table.
    pub fn walk(stream: &mut BoundedStream, start: u64, diag: &mut Diagnostics) -> Self {
        let mut table = Self::default();
        let mut seen: BTreeSet<u64> = BTreeSet::new();
        let mut offset = start;

        while offset != 0 {
            if !seen.insert(offset) {
                diag.warn(offset, "zone table chain loops back on itself, stopping");
                break;
            }
            if !stream.check_position(offset + TABLE_HEADER_SIZE)
                || !stream.seek(offset as i64, SeekWhence::Set)
            {
                diag.warn(offset, "zone table header out of bounds");
                break;
            }
            let Some(count) = stream.read_u8() else {
                break;
            };
            let _reserved = stream.read_u8();
            let (Some(self_ptr), Some(next_ptr)) = (
                stream.read_u32(crate::common::Endian::Big),
                stream.read_u32(crate::common::Endian::Big),
            ) else {
                diag.warn(offset, "truncated zone table header");
                break;
            };
            if u64::from(self_ptr) != offset {
                diag.warn(
                    offset,
                    format!("zone table self pointer {self_ptr:#x} does not match, aborting walk"),
                );
                break;
            }
            let rows_end = offset + TABLE_HEADER_SIZE + TABLE_ROW_SIZE * u64::from(count);
            if !stream.check_position(rows_end) {
                diag.warn(offset, format!("zone table declares {count} rows past end of data"));
                break;
            }
            for row_index in 0..count {
                let Some(raw) = stream.read_data(TABLE_ROW_SIZE) else {
                    break;
                };
                let Ok(row) = RawZoneRow::read_from_bytes(&raw) else {
                    break;
                };
                let begin = u64::from(row.begin.get());
                if begin == 0 || !stream.check_position(begin + ZoneHeader::SIZE) {
                    diag.warn(
                        offset,
                        format!("zone table row {row_index}: begin {begin:#x} out of bounds, skipped"),
                    );
                    continue;
                }
                table.insert(
                    Zone::new(row.kind_tag, row.id.get(), row.sub_id.get(), begin),
                    diag,
                );
            }
            offset = u64::from(next_ptr);
            if offset != 0 && !stream.check_position(offset) {
                diag.warn(offset, "next zone table pointer out of bounds");
                break;
            }
        }
        table
    }

    fn insert(&mut self, zone: Zone, diag: &mut Diagnostics) {
        if self.by_id.contains_key(&zone.id) {
            diag.warn(
                zone.entry.begin,
                format!("duplicate zone id {}, keeping the first", zone.id),
            );
        } else {
            self.by_id.insert(zone.id, self.zones.len());
        }
        self.zones.push(zone);
    }

    /// Number of zones collected, duplicates included.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no valid zone was found.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones in read order.
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    /// Mutable zones in read order (the dispatcher marks them parsed).
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Zone> {
        self.zones.iter_mut()
    }

    /// First zone declared with the given id.
    pub fn get(&self, id: u16) -> Option<&Zone> {
        self.by_id.get(&id).map(|&index| &self.zones[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Append a 10-byte table header.
    fn push_table_header(buf: &mut Vec<u8>, offset: u32, count: u8, next: u32) {
        buf.push(count);
        buf.push(0);
        buf.extend_from_slice(&offset.to_be_bytes());
        buf.extend_from_slice(&next.to_be_bytes());
    }

    /// Append a 16-byte row.
    fn push_row(buf: &mut Vec<u8>, tag: u8, begin: u32, id: u16, sub_id: u16) {
        buf.push(tag);
        buf.push(0);
        buf.extend_from_slice(&begin.to_be_bytes());
        buf.extend_from_slice(&id.to_be_bytes());
        buf.extend_from_slice(&sub_id.to_be_bytes());
        buf.extend_from_slice(&[0u8; 6]);
    }

    fn file_with_table(build: impl FnOnce(&mut Vec<u8>)) -> BoundedStream {
        let mut buf = vec![0u8; 64];
        build(&mut buf);
        buf.resize(4096, 0);
        BoundedStream::from(buf)
    }

    #[test]
    fn test_walk_single_table() {
        let mut stream = file_with_table(|buf| {
            push_table_header(buf, 64, 2, 0);
            push_row(buf, 1, 0x100, 1, 0);
            push_row(buf, 4, 0x200, 2, 0);
        });
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().kind_tag, 1);
        assert_eq!(table.get(2).unwrap().entry.begin, 0x200);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_walk_zero_rows_is_valid() {
        let mut stream = file_with_table(|buf| push_table_header(buf, 64, 0, 0));
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert!(table.is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn test_walk_detects_cycle() {
        // second table chains back to the first
        let mut buf = vec![0u8; 64];
        push_table_header(&mut buf, 64, 1, 0x200);
        push_row(&mut buf, 1, 0x100, 1, 0);
        buf.resize(0x200, 0);
        push_table_header(&mut buf, 0x200, 1, 64);
        push_row(&mut buf, 2, 0x100, 2, 0);
        buf.resize(4096, 0);
        let mut stream = BoundedStream::from(buf);
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert_eq!(table.len(), 2);
        assert!(diag.iter().any(|d| d.message.contains("loops back")));
    }

    #[test]
    fn test_walk_self_pointer_mismatch_aborts() {
        let mut stream = file_with_table(|buf| {
            push_table_header(buf, 0xBEEF, 1, 0);
            push_row(buf, 1, 0x100, 1, 0);
        });
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert!(table.is_empty());
        assert!(diag.iter().any(|d| d.message.contains("self pointer")));
    }

    #[test]
    fn test_bad_row_does_not_abort_walk() {
        let mut stream = file_with_table(|buf| {
            push_table_header(buf, 64, 3, 0);
            push_row(buf, 1, 0x100, 1, 0);
            push_row(buf, 2, 0xFFFF_0000, 2, 0); // out of bounds
            push_row(buf, 4, 0x200, 3, 0);
        });
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert_eq!(table.len(), 2);
        assert!(table.get(2).is_none());
        assert!(table.get(3).is_some());
        assert!(diag.iter().any(|d| d.message.contains("out of bounds")));
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let mut stream = file_with_table(|buf| {
            push_table_header(buf, 64, 2, 0);
            push_row(buf, 1, 0x100, 7, 0);
            push_row(buf, 2, 0x200, 7, 1);
        });
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(7).unwrap().entry.begin, 0x100);
        assert!(diag.iter().any(|d| d.message.contains("duplicate zone id")));
    }

    #[test]
    fn test_chained_tables_accumulate() {
        let mut buf = vec![0u8; 64];
        push_table_header(&mut buf, 64, 1, 0x300);
        push_row(&mut buf, 1, 0x100, 1, 0);
        buf.resize(0x300, 0);
        push_table_header(&mut buf, 0x300, 1, 0);
        push_row(&mut buf, 4, 0x180, 2, 0);
        buf.resize(4096, 0);
        let mut stream = BoundedStream::from(buf);
        let mut diag = Diagnostics::default();
        let table = ZoneTable::walk(&mut stream, 64, &mut diag);
        assert_eq!(table.len(), 2);
        assert!(diag.is_empty());
    }
}
