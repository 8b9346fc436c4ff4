//! Reading the contents of encapsulated pixel data:
//! the basic offset table and the fragments that follow it.

use crate::error::{
    BadItemHeaderSnafu, ReadOffsetTableSnafu, Result, UnexpectedOffsetTableSnafu,
};
use crate::util::read_or_eof;
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcmjpeg_core::header::{ItemHeader, Length, Tag};
use snafu::ResultExt;
use std::io::{self, Read};
use tracing::{debug, trace};

fn read_item_header<S>(source: &mut S) -> io::Result<Option<(Tag, Length)>>
where
    S: ?Sized + Read,
{
    let mut buf = [0u8; 8];
    if !read_or_eof(source, &mut buf)? {
        return Ok(None);
    }
    let tag = Tag(
        LittleEndian::read_u16(&buf[0..2]),
        LittleEndian::read_u16(&buf[2..4]),
    );
    Ok(Some((tag, Length(LittleEndian::read_u32(&buf[4..8])))))
}

/// Read the basic offset table,
/// the first item of an encapsulated pixel data element.
///
/// The item's declared length is honored,
/// so the source is left at the first fragment's item header
/// whether the table is empty or holds any number of entries.
/// The offsets are returned in the order of the table.
pub fn read_offset_table<S>(source: &mut S) -> Result<Vec<u32>>
where
    S: ?Sized + Read,
{
    let (tag, len) = read_item_header(source)
        .and_then(|header| header.ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof)))
        .context(ReadOffsetTableSnafu)?;
    let header = ItemHeader::new(tag, len).context(BadItemHeaderSnafu)?;

    let len = match header {
        ItemHeader::Item { len } => len.get(),
        _ => None,
    };
    let len = match len {
        Some(len) if len % 4 == 0 => len,
        _ => return UnexpectedOffsetTableSnafu { header }.fail(),
    };

    // the declared length is not trusted for allocation
    let mut buf = Vec::new();
    Read::take(&mut *source, u64::from(len))
        .read_to_end(&mut buf)
        .context(ReadOffsetTableSnafu)?;
    if buf.len() as u64 != u64::from(len) {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof)).context(ReadOffsetTableSnafu);
    }
    let offsets: Vec<u32> = buf.chunks_exact(4).map(LittleEndian::read_u32).collect();
    debug!("Basic offset table with {} entries", offsets.len());
    Ok(offsets)
}

/// A reader over the concatenated contents
/// of the fragments of encapsulated pixel data.
///
/// The reader crosses fragment item boundaries transparently
/// and reports the end of data at the sequence delimiter
/// or when the underlying source ends.
/// An unexpected item header surfaces as an error of kind
/// [`InvalidData`](std::io::ErrorKind::InvalidData).
#[derive(Debug)]
pub struct FragmentReader<R> {
    source: R,
    /// bytes left in the current fragment
    remaining: u32,
    fragments: u32,
    done: bool,
}

impl<R> FragmentReader<R>
where
    R: Read,
{
    /// Create a fragment reader over a source
    /// positioned at the item header of the first fragment.
    pub fn new(source: R) -> Self {
        FragmentReader {
            source,
            remaining: 0,
            fragments: 0,
            done: false,
        }
    }

    /// The number of fragment items entered so far.
    pub fn fragments_read(&self) -> u32 {
        self.fragments
    }

    /// Whether the end of the encapsulated pixel data was reached.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Retrieve the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn next_fragment(&mut self) -> io::Result<()> {
        let (tag, len) = match read_item_header(&mut self.source)? {
            Some(header) => header,
            None => {
                self.done = true;
                return Ok(());
            }
        };

        match ItemHeader::new(tag, len) {
            Ok(ItemHeader::Item { len }) => {
                let len = len.get().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        "pixel data fragment with undefined length",
                    )
                })?;
                trace!("Fragment #{} of {} bytes", self.fragments, len);
                self.fragments += 1;
                self.remaining = len;
                Ok(())
            }
            Ok(ItemHeader::SequenceDelimiter) => {
                trace!("End of pixel data after {} fragments", self.fragments);
                self.done = true;
                Ok(())
            }
            Ok(ItemHeader::ItemDelimiter) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unexpected item delimiter in encapsulated pixel data",
            )),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

impl<R> Read for FragmentReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.remaining == 0 {
            if self.done {
                return Ok(0);
            }
            self.next_fragment()?;
        }

        let max = buf.len().min(self.remaining as usize);
        let n = self.source.read(&mut buf[..max])?;
        if n == 0 {
            // truncated fragment
            self.done = true;
            self.remaining = 0;
            return Ok(0);
        }
        self.remaining -= n as u32;
        Ok(n)
    }
}
