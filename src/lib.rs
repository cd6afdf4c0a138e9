//! Quince - A Rust library for decoding legacy Macintosh office documents
//!
//! This library implements the shared binary decoding and record-reassembly
//! core used by zone-based classic Mac document formats: a bounded seekable
//! stream with scoped limits, a splay-tree adaptive decompressor, a chained
//! zone-table walker, and a registry-driven zone dispatcher feeding structural
//! readers that populate an in-memory document model.
//!
//! # Features
//!
//! - **Bounded streams**: Seekable byte readers with a LIFO stack of section
//!   limits, so nested records can never read past their enclosing zone
//! - **Splay-tree decompression**: Adaptive prefix-coded zones are inflated
//!   without any stored frequency table
//! - **Partial-failure tolerance**: One corrupt zone or record never aborts
//!   the whole document; failures are reported through an injected
//!   diagnostics collector
//! - **Zero-copy slicing**: Uncompressed zones are views into the original
//!   buffer, not copies
//!
//! # Example - Decoding a document
//!
//! ```no_run
//! use quince::hmw::HmwParser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("letter.hmw")?;
//! let mut parser = HmwParser::new(data);
//! let document = parser.parse()?;
//!
//! for paragraph in document.paragraphs() {
//!     println!("{}", paragraph);
//! }
//! for (_, frame) in document.frames() {
//!     println!("frame {} on page {}", frame.id, frame.page);
//! }
//!
//! // Zones without a registered reader are reported, never fatal.
//! for diag in parser.diagnostics().iter() {
//!     eprintln!("{}", diag);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level zone access
//!
//! ```no_run
//! use quince::input::BoundedStream;
//! use quince::zone::ZoneTable;
//! use quince::diag::Diagnostics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("letter.hmw")?;
//! let mut stream = BoundedStream::from(data);
//! let mut diag = Diagnostics::default();
//! let table = ZoneTable::walk(&mut stream, 0x042c, &mut diag);
//! for zone in table.iter() {
//!     println!("zone {} type {:#04x} at {:#x}", zone.id, zone.kind_tag, zone.entry.begin);
//! }
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod compress;
pub mod diag;
pub mod document;
pub mod hmw;
pub mod input;
pub mod zone;

// Re-exports for convenient access
pub use common::error::{Error, Result};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use document::Document;
pub use hmw::HmwParser;
pub use input::{BoundedStream, Entry};
