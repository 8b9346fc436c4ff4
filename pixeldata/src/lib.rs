//! This crate extracts the image embedded in a DICOM file
//! as encapsulated JPEG pixel data,
//! decoding it into a grid of 8-bit samples.
//!
//! The file is read in a single forward pass:
//! after checking the preamble and `DICM` magic code,
//! data elements are skipped until the pixel data element
//! with an undefined length is found.
//! Its fragments are then handed to a [`BlockCodec`],
//! which produces the frame one scanline at a time.
//!
//! # Example
//!
//! ```no_run
//! let pixels = dcmjpeg_pixeldata::open_pixel_data("path/to/file.dcm")?;
//! assert_eq!(pixels.columns(), 1024);
//! let top_left = pixels.get(0, 0);
//! # Result::<(), Box<dyn std::error::Error>>::Ok(())
//! ```
//!
//! Use [`ExtractOptions`] for faster, less accurate decoding
//! or for an output buffer of the frame's own size.
//!
//! Failures are told apart through [`Error::kind`].
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(missing_debug_implementations, unused_import_braces)]

use snafu::{Backtrace, Snafu};
use std::path::{Path, PathBuf};

pub mod buffer;
pub mod codec;
pub mod extract;
pub mod jpeg;

pub use buffer::{OutputShape, PixelBuffer};
pub use codec::{BlockCodec, DecodeError, DecodeMode, FrameInfo, ScanlineDecoder};
pub use extract::{decode_encapsulated, ExtractOptions};
pub use jpeg::JpegCodec;

/// An error which may occur when extracting pixel data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Could not open file '{}'", filename.display()))]
    OpenFile {
        filename: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not read the file preamble"))]
    ReadPreamble {
        #[snafu(backtrace)]
        source: dcmjpeg_parser::Error,
    },
    #[snafu(display("Invalid DICOM file: missing preamble or `DICM` magic code"))]
    InvalidPreamble { backtrace: Backtrace },
    #[snafu(display("Could not locate encapsulated pixel data"))]
    Scan {
        #[snafu(backtrace)]
        source: dcmjpeg_parser::Error,
    },
    #[snafu(display("Could not read the basic offset table of the pixel data"))]
    OffsetTable {
        #[snafu(backtrace)]
        source: dcmjpeg_parser::Error,
    },
    #[snafu(display(
        "Image of {}x{} exceeds the maximum output size of {}x{}",
        columns,
        rows,
        max_columns,
        max_rows
    ))]
    ImageTooLarge {
        columns: u32,
        rows: u32,
        max_columns: u32,
        max_rows: u32,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not decode embedded frame"))]
    Decode {
        source: DecodeError,
        backtrace: Backtrace,
    },
    #[snafu(display("Decoder stopped after {} of {} rows", produced, rows))]
    IncompleteFrame {
        produced: u32,
        rows: u32,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The broad category of an extraction [`Error`].
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The input file could not be opened.
    Open,
    /// The input is not a DICOM file,
    /// it has no encapsulated pixel data within reach,
    /// or its frame does not fit the output.
    Format,
    /// An element with an undefined length other than pixel data
    /// was found before the pixel data.
    UnsupportedElement,
    /// The embedded frame could not be decoded.
    Decode,
}

impl Error {
    /// Obtain the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::OpenFile { .. } => ErrorKind::Open,
            Error::ReadPreamble { .. }
            | Error::InvalidPreamble { .. }
            | Error::OffsetTable { .. }
            | Error::ImageTooLarge { .. } => ErrorKind::Format,
            Error::Scan {
                source: dcmjpeg_parser::Error::UnsupportedElement { .. },
            } => ErrorKind::UnsupportedElement,
            Error::Scan { .. } => ErrorKind::Format,
            Error::Decode { .. } | Error::IncompleteFrame { .. } => ErrorKind::Decode,
        }
    }
}

/// Extract the pixel data of the DICOM file at the given path
/// into a 1024×1024 buffer, with default quality decoding.
///
/// See [`ExtractOptions`] for more options.
pub fn open_pixel_data<P>(path: P) -> Result<PixelBuffer>
where
    P: AsRef<Path>,
{
    ExtractOptions::new().open_file(path)
}
