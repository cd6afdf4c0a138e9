//! Constants for the HMW zone container format.

/// File signature: three magic bytes plus the format generation.
pub const MAGIC: &[u8; 4] = b"HMW\x02";

/// Size of the file header: magic (4), version u16, reserved u16, first
/// zone-table offset u32.
pub const HEADER_SIZE: u64 = 12;

/// Offset of the first zone-table pointer within the header.
pub const TABLE_PTR_OFFSET: u64 = 8;

/// Fixed size of one frame-table record.
pub const FRAME_RECORD_SIZE: u64 = 156;

/// Offset of the fixed position/dimension block within a frame record.
pub const FRAME_FIXED_BLOCK_OFFSET: u64 = 64;

/// Longest accepted inline frame name; larger length bytes are corrupt.
pub const MAX_FRAME_NAME_LEN: u8 = 31;

/// Longest accepted font name.
pub const MAX_FONT_NAME_LEN: u8 = 63;

/// Zone type tags with registered structural readers.
pub mod tags {
    /// Body text runs
    pub const TEXT: u8 = 1;
    /// Frame definition table
    pub const FRAME_TABLE: u8 = 2;
    /// Paragraph/character style table (no reader yet)
    pub const STYLE_TABLE: u8 = 3;
    /// Font-name table
    pub const FONT_NAMES: u8 = 4;
    /// Print setup record
    pub const PRINT_INFO: u8 = 5;
}
