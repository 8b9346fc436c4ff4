//! Crate-level error type for reading a DICOM element stream.

use dcmjpeg_core::header::{ItemHeader, ItemHeaderError};
use dcmjpeg_core::Tag;
use snafu::{Backtrace, Snafu};

/// Type alias for a result from this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error which may occur while walking
/// the element stream of a DICOM file.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The file preamble or the `DICM` magic code
    /// could not be read for reasons other than
    /// reaching the end of the stream.
    #[snafu(display("Could not read the file preamble"))]
    ReadPreamble {
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// The header of the next data element could not be read.
    #[snafu(display("Could not read data element header"))]
    ReadHeader {
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// The value of a data element could not be skipped over.
    #[snafu(display("Could not skip value of data element tagged {}", tag))]
    SkipValue {
        tag: Tag,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// The value of a data element of interest could not be read.
    #[snafu(display("Could not read value of data element tagged {}", tag))]
    ReadValue {
        tag: Tag,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// The stream ended before an encapsulated pixel data element was found.
    #[snafu(display(
        "Reached the end of the stream after {} elements without finding encapsulated pixel data",
        elements
    ))]
    MissingPixelData { elements: u32, backtrace: Backtrace },

    /// An element with an undefined length other than pixel data was found.
    /// Its extent cannot be determined without parsing its contents.
    #[snafu(display("Unsupported data element tagged {} with undefined length", tag))]
    UnsupportedElement { tag: Tag, backtrace: Backtrace },

    /// The item header of the basic offset table could not be read.
    #[snafu(display("Could not read basic offset table"))]
    ReadOffsetTable {
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// The item header found where the basic offset table was expected
    /// is not a valid item header.
    #[snafu(display("Bad item header in encapsulated pixel data"))]
    BadItemHeader {
        #[snafu(backtrace)]
        source: ItemHeaderError,
    },

    /// The basic offset table is not a well formed item.
    #[snafu(display("Unexpected basic offset table {:?}", header))]
    UnexpectedOffsetTable {
        header: ItemHeader,
        backtrace: Backtrace,
    },
}
