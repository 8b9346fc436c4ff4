//! This crate walks the element stream of a DICOM file
//! up to its encapsulated pixel data.
//!
//! The reading process is strictly sequential
//! and never rewinds its source:
//!
//! 1. [`read_preamble`] consumes the 128-byte preamble
//!    and checks the `DICM` magic code;
//! 2. a [`Scanner`] reads data element headers with an [`ElementReader`],
//!    skipping values by their declared length,
//!    until the pixel data element with an undefined length shows up;
//! 3. [`read_offset_table`] consumes the basic offset table,
//!    after which a [`FragmentReader`] exposes
//!    the concatenated fragment contents as a plain byte stream,
//!    ready to be handed to an image decoder.
//!
//! Only the Explicit VR Little Endian encoding is understood.
//!
//! # Example
//!
//! ```no_run
//! use dcmjpeg_parser::{read_offset_table, read_preamble, FragmentReader, Scanner};
//! # use std::io::Read;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = std::io::BufReader::new(std::fs::File::open("image.dcm")?);
//! if read_preamble(&mut file)? {
//!     let pixel_data = Scanner::new().scan(&mut file)?;
//!     read_offset_table(&mut file)?;
//!     let mut jpeg = Vec::new();
//!     FragmentReader::new(&mut file).read_to_end(&mut jpeg)?;
//! }
//! # Ok(())
//! # }
//! ```
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(missing_debug_implementations, unused_import_braces)]

pub mod element;
pub mod encapsulated;
pub mod error;
pub mod preamble;
pub mod scan;

mod util;

pub use element::ElementReader;
pub use encapsulated::{read_offset_table, FragmentReader};
pub use error::{Error, Result};
pub use preamble::read_preamble;
pub use scan::{DeclaredAttributes, EncapsulatedPixelData, Scanner};
