//! HMW: the exemplar zone-based document format.
//!
//! An HMW file is a short header pointing at a chain of zone tables; every
//! piece of the document (text, frames, fonts, print setup) lives in its own
//! zone, individually compressed. This module wires the generic zone core to
//! the format's type tags and record layouts.

/// Constants: magic bytes, tag values, record sizes
pub mod consts;

/// Top-level parser: signature check, walk, dispatch
mod parser;

/// Frame-table structural reader
mod frames;

/// Font-name-table structural reader
mod fonts;

/// Print-info structural reader
mod printinfo;

/// Text-zone structural reader
mod text;

use crate::zone::dispatch::ZoneRegistry;

// Re-export public types for convenient access
pub use parser::HmwParser;

/// Zone type as dispatched by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Text,
    FrameTable,
    StyleTable,
    FontNames,
    PrintInfo,
    /// Tag with no registered reader; kept for diagnostics
    Unknown(u8),
}

impl ZoneKind {
    /// Classify a raw type tag.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            consts::tags::TEXT => Self::Text,
            consts::tags::FRAME_TABLE => Self::FrameTable,
            consts::tags::STYLE_TABLE => Self::StyleTable,
            consts::tags::FONT_NAMES => Self::FontNames,
            consts::tags::PRINT_INFO => Self::PrintInfo,
            other => Self::Unknown(other),
        }
    }
}

/// The registry with every HMW structural reader registered.
///
/// Style tables are recognized but have no reader yet; they go through the
/// unparsed fallback like any unknown tag.
pub fn default_registry() -> ZoneRegistry {
    let mut registry = ZoneRegistry::new();
    registry.register(consts::tags::TEXT, text::read_text);
    registry.register(consts::tags::FRAME_TABLE, frames::read_frame_table);
    registry.register(consts::tags::FONT_NAMES, fonts::read_font_names);
    registry.register(consts::tags::PRINT_INFO, printinfo::read_print_info);
    registry
}
