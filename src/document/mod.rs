//! In-memory document model populated by the structural readers.
//!
//! The model is the single owned aggregate all readers mutate, through
//! narrow insert/lookup methods keyed by the ids found in zones. The
//! output/rendering layer walks it after the decode pass; nothing here
//! refers back into the streams.

use std::collections::BTreeMap;

/// Rectangle in page coordinates, classic Mac order (top, left, bottom,
/// right).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rect {
    #[inline]
    pub fn width(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        i32::from(self.bottom) - i32::from(self.top)
    }

    /// Both extents are non-negative.
    pub fn is_sane(&self) -> bool {
        self.width() >= 0 && self.height() >= 0
    }
}

/// The two record shapes found in a frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// An inline picture
    Picture,
    /// An attached object referenced by content id
    Attachment,
}

/// One frame: a positioned box on a page holding a picture or attachment.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame id, unique per document (first declaration wins)
    pub id: u16,
    pub kind: FrameKind,
    /// Optional inline name
    pub name: Option<String>,
    /// Content id of an attachment's data zone
    pub content_id: Option<u32>,
    /// Page the frame sits on
    pub page: u16,
    /// Position of the top-left corner
    pub position: (i16, i16),
    /// Width and height
    pub size: (u16, u16),
}

/// One decoded font-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    /// Font name as stored in the file
    pub name: String,
    /// Global font id assigned by the [`FontMapper`] collaborator
    pub mapped_id: u16,
}

/// Ordered font list; the index is the file-local font id used by text
/// zones.
#[derive(Debug, Default)]
pub struct FontList {
    entries: Vec<FontEntry>,
}

impl FontList {
    pub fn push(&mut self, name: String, mapped_id: u16) {
        self.entries.push(FontEntry { name, mapped_id });
    }

    /// Entry for a file-local font id.
    pub fn get(&self, local_id: u16) -> Option<&FontEntry> {
        self.entries.get(usize::from(local_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FontEntry> {
        self.entries.iter()
    }
}

/// External collaborator mapping font names to global font ids.
pub trait FontMapper {
    fn map_font(&mut self, name: &str) -> u16;
}

/// Default mapper assigning ids in order of first appearance.
#[derive(Debug, Default)]
pub struct SequentialFontMapper {
    ids: BTreeMap<String, u16>,
}

impl FontMapper for SequentialFontMapper {
    fn map_font(&mut self, name: &str) -> u16 {
        let next = self.ids.len() as u16;
        *self.ids.entry(name.to_owned()).or_insert(next)
    }
}

/// Decoded print information: the paper rectangle and the printable page
/// rectangle within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintInfo {
    pub paper: Rect,
    pub page: Rect,
}

/// The decoded document: frames, fonts, print setup and text.
#[derive(Debug, Default)]
pub struct Document {
    frames: BTreeMap<u16, Frame>,
    fonts: FontList,
    print_info: Option<PrintInfo>,
    paragraphs: Vec<String>,
    unparsed: Vec<(u8, u16)>,
}

impl Document {
    /// Insert a frame; the first declaration of an id wins. Returns whether
    /// the frame was inserted.
    pub fn insert_frame(&mut self, frame: Frame) -> bool {
        match self.frames.entry(frame.id) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(frame);
                true
            }
        }
    }

    pub fn frame(&self, id: u16) -> Option<&Frame> {
        self.frames.get(&id)
    }

    pub fn frames(&self) -> impl Iterator<Item = (&u16, &Frame)> {
        self.frames.iter()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn fonts(&self) -> &FontList {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontList {
        &mut self.fonts
    }

    pub fn set_print_info(&mut self, info: PrintInfo) {
        self.print_info = Some(info);
    }

    pub fn print_info(&self) -> Option<&PrintInfo> {
        self.print_info.as_ref()
    }

    pub fn push_paragraph(&mut self, text: String) {
        self.paragraphs.push(text);
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Record a zone that was seen but has no structural reader.
    pub fn record_unparsed(&mut self, kind_tag: u8, id: u16) {
        self.unparsed.push((kind_tag, id));
    }

    /// Zones seen but not consumed by any reader, in decode order.
    pub fn unparsed(&self) -> &[(u8, u16)] {
        &self.unparsed
    }
}
