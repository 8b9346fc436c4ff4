//! The element stream scanner,
//! which walks a DICOM data set in a single forward pass
//! until it finds encapsulated pixel data.

use crate::element::ElementReader;
use crate::error::{
    MissingPixelDataSnafu, ReadValueSnafu, Result, SkipValueSnafu, UnsupportedElementSnafu,
};
use crate::util::read_or_eof;
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcmjpeg_core::header::{ElementHeader, Tag};
use dcmjpeg_core::tags;
use snafu::{ensure, ResultExt};
use std::io::{self, Read};
use tracing::{debug, trace};

/// The longest UID value, padding included.
const MAX_UID_LENGTH: u32 = 64;

/// Attributes picked up by the scanner on its way to the pixel data.
///
/// These are never required:
/// each one is only available if it appeared before the pixel data
/// with a value of the expected size.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeclaredAttributes {
    /// Transfer Syntax UID, without trailing padding
    pub transfer_syntax: Option<String>,
    /// Rows
    pub rows: Option<u16>,
    /// Columns
    pub columns: Option<u16>,
    /// Bits Allocated
    pub bits_allocated: Option<u16>,
}

/// The outcome of a successful scan:
/// the source is positioned right after the header
/// of an encapsulated pixel data element.
#[derive(Debug, Clone, PartialEq)]
pub struct EncapsulatedPixelData {
    /// The header of the pixel data element.
    pub header: ElementHeader,
    /// The attributes declared before the pixel data.
    pub attributes: DeclaredAttributes,
    /// The number of data elements read, pixel data included.
    pub elements_read: u32,
}

/// A single pass scanner over the data elements of a DICOM data set.
///
/// The scanner expects the source to be positioned
/// right after the preamble and magic code.
/// Element values are skipped by their declared length,
/// except for the few attributes recorded in [`DeclaredAttributes`].
#[derive(Debug, Default)]
pub struct Scanner {
    reader: ElementReader,
    attributes: DeclaredAttributes,
    elements_read: u32,
}

impl Scanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Scanner::default()
    }

    /// Read data elements from the source until
    /// the encapsulated pixel data element is found.
    ///
    /// # Errors
    ///
    /// - [`UnsupportedElement`](crate::Error::UnsupportedElement)
    ///   if any other element with an undefined length is found;
    /// - [`MissingPixelData`](crate::Error::MissingPixelData)
    ///   if the source ends first,
    ///   which includes the case of pixel data with a defined length;
    /// - other variants on I/O errors.
    pub fn scan<S>(mut self, source: &mut S) -> Result<EncapsulatedPixelData>
    where
        S: ?Sized + Read,
    {
        loop {
            let header = match self.reader.read_header(source)? {
                Some(header) => header,
                None => {
                    return MissingPixelDataSnafu {
                        elements: self.elements_read,
                    }
                    .fail()
                }
            };
            self.elements_read += 1;
            trace!("{}", header);

            let len = match header.len.get() {
                Some(len) => len,
                None => {
                    ensure!(
                        header.tag == tags::PIXEL_DATA,
                        UnsupportedElementSnafu { tag: header.tag }
                    );
                    debug!(
                        "Found encapsulated pixel data after {} elements",
                        self.elements_read
                    );
                    return Ok(EncapsulatedPixelData {
                        header,
                        attributes: self.attributes,
                        elements_read: self.elements_read,
                    });
                }
            };

            let complete = if self.is_declared_attribute(header.tag, len) {
                self.read_attribute(source, header.tag, len)?
            } else {
                skip_value(source, header.tag, len)?
            };

            if !complete {
                return MissingPixelDataSnafu {
                    elements: self.elements_read,
                }
                .fail();
            }
        }
    }

    fn is_declared_attribute(&self, tag: Tag, len: u32) -> bool {
        match tag {
            tags::TRANSFER_SYNTAX_UID => len <= MAX_UID_LENGTH,
            tags::ROWS | tags::COLUMNS | tags::BITS_ALLOCATED => len == 2,
            _ => false,
        }
    }

    /// Read and record the value of an attribute of interest.
    /// Returns `false` if the source ended within the value.
    fn read_attribute<S>(&mut self, source: &mut S, tag: Tag, len: u32) -> Result<bool>
    where
        S: ?Sized + Read,
    {
        let mut buf = vec![0u8; len as usize];
        if !read_or_eof(source, &mut buf).context(ReadValueSnafu { tag })? {
            return Ok(false);
        }

        match tag {
            tags::TRANSFER_SYNTAX_UID => {
                let uid = String::from_utf8_lossy(&buf)
                    .trim_end_matches(&['\0', ' '][..])
                    .to_string();
                debug!("Transfer syntax: {}", uid);
                self.attributes.transfer_syntax = Some(uid);
            }
            tags::ROWS => self.attributes.rows = Some(LittleEndian::read_u16(&buf)),
            tags::COLUMNS => self.attributes.columns = Some(LittleEndian::read_u16(&buf)),
            tags::BITS_ALLOCATED => {
                self.attributes.bits_allocated = Some(LittleEndian::read_u16(&buf))
            }
            _ => {}
        }
        Ok(true)
    }
}

/// Skip over `len` bytes of an element's value.
/// Returns `false` if the source ended first.
fn skip_value<S>(source: &mut S, tag: Tag, len: u32) -> Result<bool>
where
    S: ?Sized + Read,
{
    let skipped = io::copy(&mut Read::take(source, u64::from(len)), &mut io::sink())
        .context(SkipValueSnafu { tag })?;
    Ok(skipped == u64::from(len))
}
