//! Text-zone structural reader.
//!
//! Body text is stored as MacRoman bytes with carriage returns separating
//! paragraphs, the classic Mac line-ending convention.

use crate::common::binary;
use crate::input::BoundedStream;
use crate::zone::Zone;
use crate::zone::dispatch::DecodeContext;

/// Consume a text zone, appending one paragraph per CR-terminated run.
pub fn read_text(input: &mut BoundedStream, zone: &Zone, ctx: &mut DecodeContext<'_>) -> bool {
    let remaining = input.limit() - input.tell();
    let Some(data) = input.read_data(remaining) else {
        return false;
    };
    if data.is_empty() {
        ctx.diag.warn(zone.entry.begin, "text zone is empty");
        return false;
    }
    let text = binary::decode_mac_roman(&data);
    for paragraph in text.split_terminator('\r') {
        ctx.document.push_paragraph(paragraph.to_owned());
    }
    true
}
