//! Print-info structural reader.
//!
//! The zone carries the classic Mac print record reduced to its two
//! rectangles: the physical paper and the printable page within it, four
//! big-endian i16 coordinates each in (top, left, bottom, right) order.

use crate::common::Endian;
use crate::document::{PrintInfo, Rect};
use crate::input::BoundedStream;
use crate::zone::Zone;
use crate::zone::dispatch::DecodeContext;

fn read_rect(input: &mut BoundedStream) -> Option<Rect> {
    Some(Rect {
        top: input.read_i16(Endian::Big)?,
        left: input.read_i16(Endian::Big)?,
        bottom: input.read_i16(Endian::Big)?,
        right: input.read_i16(Endian::Big)?,
    })
}

/// Consume a print-info zone.
pub fn read_print_info(input: &mut BoundedStream, zone: &Zone, ctx: &mut DecodeContext<'_>) -> bool {
    let (Some(paper), Some(page)) = (read_rect(input), read_rect(input)) else {
        ctx.diag.warn(zone.entry.begin, "print info: record truncated");
        return false;
    };
    if !paper.is_sane() || !page.is_sane() {
        ctx.diag.warn(zone.entry.begin, "print info: negative page extents");
        return false;
    }
    ctx.document.set_print_info(PrintInfo { paper, page });
    true
}
