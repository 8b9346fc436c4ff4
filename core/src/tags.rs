//! Constants for the attribute tags this workspace needs to recognize
//! while walking a DICOM element stream.
//!
//! Names follow the keywords of DICOM PS3.6,
//! in screaming snake case.
use crate::header::Tag;

/// TransferSyntaxUID (0002,0010) UI
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
/// Rows (0028,0010) US
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// Columns (0028,0011) US
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// BitsAllocated (0028,0100) US
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// PixelData (7FE0,0010) OB or OW
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
/// Item (FFFE,E000)
pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
/// ItemDelimitationItem (FFFE,E00D)
pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
/// SequenceDelimitationItem (FFFE,E0DD)
pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);
