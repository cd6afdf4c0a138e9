//! Frame-table structural reader.
//!
//! A frame zone holds a 2-byte record count followed by fixed 156-byte
//! records. The first bytes of a record select one of two shapes (picture or
//! attachment) with a variable-length inline name; the position/dimension
//! block always sits at a fixed offset inside the record, and the reader
//! reseeks to the next record boundary no matter how much of the variable
//! part was actually consumed, so one malformed record cannot desynchronize
//! the rest of the table.

use crate::common::Endian;
use crate::document::{Frame, FrameKind};
use crate::hmw::consts::{FRAME_FIXED_BLOCK_OFFSET, FRAME_RECORD_SIZE, MAX_FRAME_NAME_LEN};
use crate::input::{BoundedStream, SeekWhence};
use crate::zone::Zone;
use crate::zone::dispatch::DecodeContext;

/// Read one frame record starting at the stream's current position.
fn parse_record(input: &mut BoundedStream) -> Option<Frame> {
    let record_start = input.tell();
    let discriminator = input.read_u8()?;
    let _flags = input.read_u8()?;

    let (kind, content_id) = match discriminator {
        1 => (FrameKind::Picture, None),
        2 => (FrameKind::Attachment, Some(input.read_u32(Endian::Big)?)),
        _ => return None,
    };
    let name = input.read_pascal_string(MAX_FRAME_NAME_LEN)?;

    if !input.seek(
        (record_start + FRAME_FIXED_BLOCK_OFFSET) as i64,
        SeekWhence::Set,
    ) {
        return None;
    }
    let page = input.read_u16(Endian::Big)?;
    let x = input.read_i16(Endian::Big)?;
    let y = input.read_i16(Endian::Big)?;
    let width = input.read_u16(Endian::Big)?;
    let height = input.read_u16(Endian::Big)?;
    let id = input.read_u16(Endian::Big)?;

    Some(Frame {
        id,
        kind,
        name: if name.is_empty() { None } else { Some(name) },
        content_id,
        page,
        position: (x, y),
        size: (width, height),
    })
}

/// Consume a frame-table zone.
///
/// A mismatch between the declared count and the zone length is a hard
/// failure for the zone; a malformed individual record is skipped.
pub fn read_frame_table(
    input: &mut BoundedStream,
    zone: &Zone,
    ctx: &mut DecodeContext<'_>,
) -> bool {
    let Some(count) = input.read_u16(Endian::Big) else {
        ctx.diag.warn(zone.entry.begin, "frame table: missing record count");
        return false;
    };
    let expected = 2 + FRAME_RECORD_SIZE * u64::from(count);
    if input.len() != expected {
        ctx.diag.warn(
            zone.entry.begin,
            format!(
                "frame table: {} records need {} bytes, zone has {}",
                count,
                expected,
                input.len()
            ),
        );
        return false;
    }

    for index in 0..count {
        let record_start = input.tell();
        match parse_record(input) {
            Some(frame) => {
                let id = frame.id;
                if !ctx.document.insert_frame(frame) {
                    ctx.diag.warn(
                        zone.entry.begin + record_start,
                        format!("frame table: duplicate frame id {id}, keeping the first"),
                    );
                }
            }
            None => {
                ctx.diag.warn(
                    zone.entry.begin + record_start,
                    format!("frame table: record {index} malformed, skipped"),
                );
            }
        }
        // fixed-size records: resynchronize unconditionally
        input.seek((record_start + FRAME_RECORD_SIZE) as i64, SeekWhence::Set);
    }
    true
}
