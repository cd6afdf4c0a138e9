//! Top-level HMW parser: signature check, zone-table walk, zone dispatch.

use bytes::Bytes;

use crate::common::Endian;
use crate::common::error::{Error, Result};
use crate::compress::TruncationPolicy;
use crate::diag::Diagnostics;
use crate::document::{Document, SequentialFontMapper};
use crate::hmw::{consts, default_registry};
use crate::input::{BoundedStream, SeekWhence};
use crate::zone::ZoneTable;
use crate::zone::dispatch::{DecodeContext, process_zone};

/// Parser for one HMW document.
///
/// Owns the main stream, the zone table and the diagnostics collector;
/// zones own their decompressed buffers. The decode pass is strictly
/// sequential: walk the tables, then process every zone in read order.
/// Per-zone corruption is contained and reported through
/// [`diagnostics`](Self::diagnostics); only a bad signature or a file with
/// no valid zone at all fails the whole parse.
pub struct HmwParser {
    stream: BoundedStream,
    resource_fork: Option<BoundedStream>,
    diag: Diagnostics,
    truncation: TruncationPolicy,
}

impl HmwParser {
    /// Create a parser over a file's data fork.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            stream: BoundedStream::new(data.into()),
            resource_fork: None,
            diag: Diagnostics::new(),
            truncation: TruncationPolicy::default(),
        }
    }

    /// Attach the file's resource fork, readable through the same bounded
    /// stream abstraction. The core never walks it on its own.
    pub fn with_resource_fork(mut self, data: impl Into<Bytes>) -> Self {
        self.resource_fork = Some(BoundedStream::new(data.into()));
        self
    }

    /// Choose how truncated compressed zones are handled.
    pub fn with_truncation_policy(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }

    /// The attached resource fork, if any.
    pub fn resource_fork(&self) -> Option<&BoundedStream> {
        self.resource_fork.as_ref()
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Validate the signature and return the first zone-table offset.
    fn check_header(&mut self) -> Result<u64> {
        if !self.stream.seek(0, SeekWhence::Set) {
            return Err(Error::NotZoneFile);
        }
        let Some(magic) = self.stream.read_data(consts::MAGIC.len() as u64) else {
            return Err(Error::NotZoneFile);
        };
        if magic[..] != consts::MAGIC[..] {
            return Err(Error::NotZoneFile);
        }
        let Some(_version) = self.stream.read_u16(Endian::Big) else {
            return Err(Error::NotZoneFile);
        };
        let _reserved = self.stream.read_u16(Endian::Big);
        let Some(table_offset) = self.stream.read_u32(Endian::Big) else {
            return Err(Error::NotZoneFile);
        };
        let table_offset = u64::from(table_offset);
        if table_offset < consts::HEADER_SIZE || !self.stream.check_position(table_offset) {
            return Err(Error::CorruptedFile(format!(
                "zone table offset {table_offset:#x} out of bounds"
            )));
        }
        Ok(table_offset)
    }

    /// Decode the document.
    ///
    /// Returns the (possibly partially) decoded document, or a single
    /// document-level failure when the file is not an HMW file or carries no
    /// valid zone at all.
    pub fn parse(&mut self) -> Result<Document> {
        let table_offset = self.check_header()?;
        let mut table = ZoneTable::walk(&mut self.stream, table_offset, &mut self.diag);
        if table.is_empty() {
            return Err(Error::CorruptedFile(
                "no valid zone found in any zone table".into(),
            ));
        }

        let registry = default_registry();
        let mut document = Document::default();
        let mut fonts = SequentialFontMapper::default();
        for zone in table.iter_mut() {
            let mut ctx = DecodeContext {
                document: &mut document,
                diag: &mut self.diag,
                fonts: &mut fonts,
            };
            process_zone(&registry, &mut self.stream, zone, &mut ctx, self.truncation);
        }

        // leftover coverage gaps are diagnostics, never errors
        for zone in table.iter() {
            if !zone.parsed {
                self.diag.note(
                    zone.entry.begin,
                    format!("zone {} (type {:#04x}) left unparsed", zone.id, zone.kind_tag),
                );
            }
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::splay_encode;
    use crate::hmw::consts::{FRAME_FIXED_BLOCK_OFFSET, FRAME_RECORD_SIZE, tags};

    /// Incremental builder for synthetic HMW files.
    struct FileBuilder {
        buf: Vec<u8>,
    }

    impl FileBuilder {
        fn new(table_offset: u32) -> Self {
            let mut buf = Vec::new();
            buf.extend_from_slice(consts::MAGIC);
            buf.extend_from_slice(&1u16.to_be_bytes());
            buf.extend_from_slice(&[0u8; 2]);
            buf.extend_from_slice(&table_offset.to_be_bytes());
            Self { buf }
        }

        fn pad_to(&mut self, offset: u32) -> &mut Self {
            assert!(self.buf.len() <= offset as usize);
            self.buf.resize(offset as usize, 0);
            self
        }

        fn table(&mut self, offset: u32, rows: &[(u8, u32, u16)], next: u32) -> &mut Self {
            self.pad_to(offset);
            self.buf.push(rows.len() as u8);
            self.buf.push(0);
            self.buf.extend_from_slice(&offset.to_be_bytes());
            self.buf.extend_from_slice(&next.to_be_bytes());
            for &(tag, begin, id) in rows {
                self.buf.push(tag);
                self.buf.push(0);
                self.buf.extend_from_slice(&begin.to_be_bytes());
                self.buf.extend_from_slice(&id.to_be_bytes());
                self.buf.extend_from_slice(&0u16.to_be_bytes());
                self.buf.extend_from_slice(&[0u8; 6]);
            }
            self
        }

        fn zone(&mut self, offset: u32, payload: &[u8], compressed: bool) -> &mut Self {
            let stored = if compressed {
                splay_encode(payload)
            } else {
                payload.to_vec()
            };
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&((payload.len() + 12) as u32).to_be_bytes());
            bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&u16::to_be_bytes(if compressed { 1 } else { 0 }));
            bytes.extend_from_slice(&[0u8; 2]);
            if compressed {
                // pad the bitstream out to the declared payload size
                let mut stored = stored;
                assert!(stored.len() <= payload.len());
                stored.resize(payload.len(), 0);
                bytes.extend_from_slice(&stored);
            } else {
                bytes.extend_from_slice(&stored);
            }
            // a zone header may overlap the reserved tail of a table row, so
            // write in place rather than append-only
            let start = offset as usize;
            let end = start + bytes.len();
            if self.buf.len() < end {
                self.buf.resize(end, 0);
            }
            self.buf[start..end].copy_from_slice(&bytes);
            self
        }

        fn finish(&mut self, total: usize) -> Vec<u8> {
            self.buf.resize(total, 0);
            std::mem::take(&mut self.buf)
        }
    }

    fn frame_record(id: u16) -> Vec<u8> {
        let mut buf = vec![1u8, 0, 0];
        buf.resize(FRAME_FIXED_BLOCK_OFFSET as usize, 0);
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&100u16.to_be_bytes());
        buf.extend_from_slice(&50u16.to_be_bytes());
        buf.extend_from_slice(&id.to_be_bytes());
        buf.resize(FRAME_RECORD_SIZE as usize, 0);
        buf
    }

    #[test]
    fn test_rejects_wrong_signature() {
        let mut parser = HmwParser::new(b"WORD\x00\x01rest of the file".to_vec());
        assert!(matches!(parser.parse(), Err(Error::NotZoneFile)));
    }

    #[test]
    fn test_rejects_file_without_zones() {
        let data = FileBuilder::new(0x40).table(0x40, &[], 0).finish(0x100);
        let mut parser = HmwParser::new(data);
        assert!(matches!(parser.parse(), Err(Error::CorruptedFile(_))));
    }

    #[test]
    fn test_decodes_complete_document() {
        let mut fonts = 2u16.to_be_bytes().to_vec();
        fonts.extend_from_slice(b"\x06Geneva\x06Monaco");
        let mut frames = 1u16.to_be_bytes().to_vec();
        frames.extend_from_slice(&frame_record(9));
        let text = b"aaaa aaaa aaaa aaaa aaaa aa\r";

        let data = FileBuilder::new(0x0400)
            .table(
                0x0400,
                &[
                    (tags::TEXT, 0x0450, 1),
                    (tags::FONT_NAMES, 0x0500, 2),
                    (tags::FRAME_TABLE, 0x0600, 3),
                    (0x7E, 0x0800, 4),
                ],
                0,
            )
            .zone(0x0450, text, true)
            .zone(0x0500, &fonts, false)
            .zone(0x0600, &frames, false)
            .zone(0x0800, b"??", false)
            .finish(0x1000);

        let mut parser = HmwParser::new(data);
        let document = parser.parse().expect("parse");
        assert_eq!(document.paragraphs(), &["aaaa aaaa aaaa aaaa aaaa aa"]);
        assert_eq!(document.fonts().len(), 2);
        assert_eq!(document.fonts().get(1).unwrap().name, "Monaco");
        assert_eq!(document.frame(9).unwrap().size, (100, 50));
        assert_eq!(document.unparsed(), &[(0x7E, 4)]);
        // the unknown zone is the only one reported unparsed
        assert!(
            parser
                .diagnostics()
                .iter()
                .any(|d| d.message.contains("left unparsed"))
        );
        assert_eq!(parser.diagnostics().warning_count(), 0);
    }

    #[test]
    fn test_compressed_text_zone_scenario() {
        // 2-row table at 0x042c; the text zone at 0x0450 declares total 40,
        // uncompressed 28, compressed flag set.
        let text = b"aaaa aaaa aaaa aaaa aaaa aa\r";
        assert_eq!(text.len(), 28);
        let data = FileBuilder::new(0x042c)
            .table(
                0x042c,
                &[(tags::TEXT, 0x0450, 1), (tags::PRINT_INFO, 0x0500, 2)],
                0,
            )
            .zone(0x0450, text, true)
            .zone(
                0x0500,
                &{
                    let mut rects = Vec::new();
                    for v in [0i16, 0, 792, 612, 36, 36, 756, 576] {
                        rects.extend_from_slice(&v.to_be_bytes());
                    }
                    rects
                },
                false,
            )
            .finish(0x1000);
        let mut parser = HmwParser::new(data);
        let document = parser.parse().expect("parse");
        assert_eq!(document.paragraphs().len(), 1);
        assert_eq!(document.print_info().unwrap().paper.height(), 792);
        assert_eq!(parser.diagnostics().warning_count(), 0);
    }

    #[test]
    fn test_one_corrupt_zone_does_not_sink_document() {
        let text = b"body\r";
        let data = FileBuilder::new(0x40)
            .table(0x40, &[(tags::TEXT, 0x100, 1), (tags::TEXT, 0x200, 2)], 0)
            // zone 1: declared sizes disagree
            .zone(0x100, b"junk", false)
            .zone(0x200, text, false)
            .finish(0x400);
        let mut corrupt = data;
        // break zone 1's uncompressed length
        corrupt[0x104..0x108].copy_from_slice(&77u32.to_be_bytes());

        let mut parser = HmwParser::new(corrupt);
        let document = parser.parse().expect("parse");
        assert_eq!(document.paragraphs(), &["body"]);
        assert!(parser.diagnostics().warning_count() >= 1);
    }

    #[test]
    fn test_resource_fork_is_exposed() {
        let data = FileBuilder::new(0x40)
            .table(0x40, &[(tags::TEXT, 0x100, 1)], 0)
            .zone(0x100, b"x\r", false)
            .finish(0x200);
        let parser = HmwParser::new(data).with_resource_fork(vec![1u8, 2, 3]);
        assert_eq!(parser.resource_fork().unwrap().len(), 3);
    }

    #[test]
    fn test_truncation_policy_is_configurable() {
        // a compressed zone whose bitstream stops mid-symbol
        let mut data = FileBuilder::new(0x40)
            .table(0x40, &[(tags::TEXT, 0x100, 1)], 0)
            .finish(0x200);
        data.resize(0x100, 0);
        data.extend_from_slice(&14u32.to_be_bytes()); // total: header + 2
        data.extend_from_slice(&2u32.to_be_bytes()); // uncompressed: 2
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 2]);
        data.extend_from_slice(&[0x01, 0x00]); // byte 0, then zeros run dry
        data.resize(0x200, 0);

        let mut parser =
            HmwParser::new(data.clone()).with_truncation_policy(TruncationPolicy::Fail);
        let document = parser.parse().expect("parse");
        assert!(document.paragraphs().is_empty());
        assert!(parser.diagnostics().warning_count() >= 1);

        let mut parser = HmwParser::new(data);
        let document = parser.parse().expect("parse");
        // best-effort recovery still yields the cleanly decoded first byte
        assert_eq!(document.paragraphs().len(), 1);
    }
}
