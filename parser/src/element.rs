//! Reading of data element headers
//! in the Explicit VR Little Endian encoding.

use crate::error::{ReadHeaderSnafu, Result};
use crate::util::read_or_eof;
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcmjpeg_core::header::{ElementHeader, Length, LengthField, RawVr, Tag};
use snafu::ResultExt;
use std::io::Read;

/// A reader of data element headers
/// for the Explicit VR Little Endian transfer syntax.
///
/// End of stream at any point of a header is not an error:
/// it is reported as the absence of a header,
/// so that a truncated element is never interpreted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementReader;

impl ElementReader {
    /// Create a new element header reader.
    pub fn new() -> Self {
        ElementReader
    }

    /// Read the next data element header from the source,
    /// leaving the source at the start of the element's value.
    ///
    /// Returns `Ok(None)` if the source ends before the header is complete.
    pub fn read_header<S>(&self, source: &mut S) -> Result<Option<ElementHeader>>
    where
        S: ?Sized + Read,
    {
        let mut buf = [0u8; 4];

        // retrieve tag
        if !read_or_eof(source, &mut buf).context(ReadHeaderSnafu)? {
            return Ok(None);
        }
        let tag = Tag(
            LittleEndian::read_u16(&buf[0..2]),
            LittleEndian::read_u16(&buf[2..4]),
        );

        if tag.is_item_group() {
            // item delimiters do not have VR or reserved field
            if !read_or_eof(source, &mut buf).context(ReadHeaderSnafu)? {
                return Ok(None);
            }
            let len = LittleEndian::read_u32(&buf);
            return Ok(Some(ElementHeader::new(
                tag,
                RawVr::new([0, 0]),
                Length(len),
            )));
        }

        // retrieve explicit VR
        if !read_or_eof(source, &mut buf[0..2]).context(ReadHeaderSnafu)? {
            return Ok(None);
        }
        let vr = RawVr::new([buf[0], buf[1]]);

        // retrieve data length
        let len = match vr.length_field() {
            LengthField::Short => {
                if !read_or_eof(source, &mut buf[0..2]).context(ReadHeaderSnafu)? {
                    return Ok(None);
                }
                u32::from(LittleEndian::read_u16(&buf[0..2]))
            }
            LengthField::Extended => {
                // 2 reserved bytes, then 4 bytes for data length
                if !read_or_eof(source, &mut buf[0..2]).context(ReadHeaderSnafu)? {
                    return Ok(None);
                }
                if !read_or_eof(source, &mut buf).context(ReadHeaderSnafu)? {
                    return Ok(None);
                }
                LittleEndian::read_u32(&buf)
            }
        };

        Ok(Some(ElementHeader::new(tag, vr, Length(len))))
    }
}
