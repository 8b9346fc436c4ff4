#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of the workspace,
//! with the data types needed to interpret
//! the element stream of a DICOM file.
//!
//! - [`header`] comprises the data types of a DICOM element header:
//!   attribute tags, value representations and value lengths,
//!   plus the item headers of encapsulated pixel data.
//! - [`tags`] holds constants for the few attributes
//!   which are recognized while scanning.
//!
//! [`header`]: ./header/index.html
//! [`tags`]: ./tags/index.html

pub mod header;
pub mod tags;

pub use header::{ElementHeader, ItemHeader, Length, LengthField, RawVr, Tag, VR};

// re-export crates that are part of the public API
pub use snafu;
