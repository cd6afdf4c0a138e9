//! Generic zone dispatcher: materialize a zone's bytes, then route them to
//! the structural reader registered for the zone's type tag.

use std::collections::BTreeMap;

use crate::compress::{self, TruncationPolicy};
use crate::diag::Diagnostics;
use crate::document::{Document, FontMapper};
use crate::input::{BoundedStream, SeekWhence};
use crate::zone::{Zone, ZoneHeader, ZoneSource};

/// Shared mutable state handed to every structural reader.
///
/// Readers mutate the document model through its narrow insert/lookup
/// methods and report problems through the diagnostics collector; they never
/// see the main stream or other zones.
pub struct DecodeContext<'a> {
    /// The single owned aggregate all readers write into
    pub document: &'a mut Document,
    /// Injected diagnostics collector
    pub diag: &'a mut Diagnostics,
    /// Collaborator mapping font names to global font ids
    pub fonts: &'a mut dyn FontMapper,
}

/// A structural reader: consumes the zone's private stream and populates the
/// document model. Returns false when the zone is corrupt; the decode
/// continues with the next zone either way.
pub type ZoneReader = fn(&mut BoundedStream, &Zone, &mut DecodeContext<'_>) -> bool;

/// Registry mapping zone type tags to structural readers.
///
/// Adding a zone type is a registration, not a switch-statement edit;
/// unregistered tags fall through to an explicit "seen but unparsed" path.
#[derive(Default)]
pub struct ZoneRegistry {
    readers: BTreeMap<u8, ZoneReader>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reader for a type tag, replacing any previous one.
    pub fn register(&mut self, kind_tag: u8, reader: ZoneReader) {
        self.readers.insert(kind_tag, reader);
    }

    /// Look up the reader for a type tag.
    pub fn get(&self, kind_tag: u8) -> Option<ZoneReader> {
        self.readers.get(&kind_tag).copied()
    }
}

/// Decode one zone and dispatch it to its structural reader.
///
/// Re-reads the zone's own header, validates the declared sizes, inflates
/// the payload when the compressed flag is set, and hands the resulting
/// private sub-stream to the registered reader. Returns whether the zone
/// ended up parsed; failure is contained to this zone.
pub fn process_zone(
    registry: &ZoneRegistry,
    stream: &mut BoundedStream,
    zone: &mut Zone,
    ctx: &mut DecodeContext<'_>,
    policy: TruncationPolicy,
) -> bool {
    let begin = zone.entry.begin;
    if !stream.seek(begin as i64, SeekWhence::Set) {
        ctx.diag.warn(begin, format!("zone {}: begin offset unreachable", zone.id));
        return false;
    }
    let Some(header) = ZoneHeader::read(stream) else {
        ctx.diag.warn(begin, format!("zone {}: header truncated", zone.id));
        return false;
    };
    if u64::from(header.total_len) != u64::from(header.uncompressed_len) + ZoneHeader::SIZE {
        ctx.diag.warn(
            begin,
            format!(
                "zone {}: declared total {} != uncompressed {} + header",
                zone.id, header.total_len, header.uncompressed_len
            ),
        );
        return false;
    }
    let end = begin + u64::from(header.total_len);
    if !stream.check_position(end) {
        ctx.diag.warn(begin, format!("zone {}: extends past end of data", zone.id));
        return false;
    }
    zone.entry.length = u64::from(header.total_len);
    zone.flags = header.flags;

    if header.is_compressed() {
        stream.push_limit(end);
        let inflated = compress::decompress(stream, u64::from(header.uncompressed_len), policy);
        stream.pop_limit();
        match inflated {
            Ok(buffer) => zone.set_source(ZoneSource::Owned(buffer)),
            Err(error) => {
                ctx.diag.warn(begin, format!("zone {}: {error}", zone.id));
                return false;
            }
        }
    } else {
        match stream.slice(begin + ZoneHeader::SIZE, u64::from(header.uncompressed_len)) {
            Some(bytes) => zone.set_source(ZoneSource::Sliced(bytes)),
            None => {
                ctx.diag.warn(begin, format!("zone {}: payload out of bounds", zone.id));
                return false;
            }
        }
    }

    // dispatch on the type tag
    let Some(mut input) = zone.input() else {
        return false;
    };
    match registry.get(zone.kind_tag) {
        Some(reader) => {
            let ok = reader(&mut input, zone, ctx);
            if ok {
                zone.parsed = true;
            } else {
                ctx.diag
                    .warn(begin, format!("zone {}: structural reader failed", zone.id));
            }
            ok
        }
        None => {
            // a coverage gap, not an error
            ctx.document.record_unparsed(zone.kind_tag, zone.id);
            ctx.diag.note(
                begin,
                format!("zone {}: no reader for type {:#04x}", zone.id, zone.kind_tag),
            );
            true
        }
    }
}
