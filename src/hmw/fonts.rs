//! Font-name-table structural reader.
//!
//! A font zone declares an entry count and then packs one Pascal string per
//! font. The read order is the file-local font id referenced by text zones,
//! so names are appended to an ordered list; the global id comes from the
//! injected [`FontMapper`](crate::document::FontMapper) collaborator.

use crate::common::Endian;
use crate::hmw::consts::MAX_FONT_NAME_LEN;
use crate::input::BoundedStream;
use crate::zone::Zone;
use crate::zone::dispatch::DecodeContext;

/// Consume a font-name zone.
///
/// A name length that would read past the zone end stops the reader early;
/// that is graceful partial acceptance, successful iff at least one name was
/// already decoded.
pub fn read_font_names(input: &mut BoundedStream, zone: &Zone, ctx: &mut DecodeContext<'_>) -> bool {
    let Some(count) = input.read_u16(Endian::Big) else {
        ctx.diag.warn(zone.entry.begin, "font table: missing entry count");
        return false;
    };
    let mut names_read = 0u16;
    for index in 0..count {
        let Some(name) = input.read_pascal_string(MAX_FONT_NAME_LEN) else {
            ctx.diag.warn(
                zone.entry.begin,
                format!("font table: name {index} of {count} crosses zone end, stopping early"),
            );
            return names_read > 0;
        };
        let mapped_id = ctx.fonts.map_font(&name);
        ctx.document.fonts_mut().push(name, mapped_id);
        names_read += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Diagnostics;
    use crate::document::{Document, FontMapper, SequentialFontMapper};

    fn zone_data(count: u16, names: &[&[u8]]) -> Vec<u8> {
        let mut buf = count.to_be_bytes().to_vec();
        for name in names {
            buf.push(name.len() as u8);
            buf.extend_from_slice(name);
        }
        buf
    }

    fn run(data: Vec<u8>) -> (Document, Diagnostics, bool) {
        let mut input = BoundedStream::from(data);
        let mut document = Document::default();
        let mut diag = Diagnostics::default();
        let mut fonts = SequentialFontMapper::default();
        let zone = Zone::new(4, 1, 0, 0);
        let ok = {
            let mut ctx = DecodeContext {
                document: &mut document,
                diag: &mut diag,
                fonts: &mut fonts,
            };
            read_font_names(&mut input, &zone, &mut ctx)
        };
        (document, diag, ok)
    }

    #[test]
    fn test_reads_declared_names_in_order() {
        let (document, diag, ok) = run(zone_data(3, &[b"Geneva", b"Monaco", b"Geneva"]));
        assert!(ok);
        assert!(diag.is_empty());
        let fonts = document.fonts();
        assert_eq!(fonts.len(), 3);
        assert_eq!(fonts.get(0).unwrap().name, "Geneva");
        assert_eq!(fonts.get(1).unwrap().name, "Monaco");
        // local ids 0 and 2 map to the same global id
        assert_eq!(fonts.get(0).unwrap().mapped_id, fonts.get(2).unwrap().mapped_id);
    }

    #[test]
    fn test_truncated_third_name_is_partial_success() {
        // third length byte promises 12 bytes the zone does not have
        let mut data = zone_data(3, &[b"Geneva", b"Monaco"]);
        data.push(12);
        data.extend_from_slice(b"Chi");
        let (document, diag, ok) = run(data);
        assert!(ok);
        assert_eq!(document.fonts().len(), 2);
        assert!(diag.iter().any(|d| d.message.contains("name 2 of 3")));
    }

    #[test]
    fn test_truncated_first_name_is_failure() {
        let mut data = 1u16.to_be_bytes().to_vec();
        data.push(40);
        let (document, _, ok) = run(data);
        assert!(!ok);
        assert!(document.fonts().is_empty());
    }

    #[test]
    fn test_mapper_collaborator_is_used() {
        struct FixedMapper;
        impl FontMapper for FixedMapper {
            fn map_font(&mut self, _name: &str) -> u16 {
                42
            }
        }
        let mut input = BoundedStream::from(zone_data(1, &[b"Courier"]));
        let mut document = Document::default();
        let mut diag = Diagnostics::default();
        let mut fonts = FixedMapper;
        let zone = Zone::new(4, 1, 0, 0);
        let mut ctx = DecodeContext {
            document: &mut document,
            diag: &mut diag,
            fonts: &mut fonts,
        };
        assert!(read_font_names(&mut input, &zone, &mut ctx));
        assert_eq!(document.fonts().get(0).unwrap().mapped_id, 42);
    }
}
