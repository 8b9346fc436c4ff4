//! Validation of the DICOM file preamble and magic code.

use crate::error::{ReadPreambleSnafu, Result};
use crate::util::read_or_eof;
use snafu::ResultExt;
use std::io::Read;
use tracing::debug;

/// The size of the file preamble, in bytes.
pub const PREAMBLE_LENGTH: usize = 128;

/// The magic code following the preamble.
pub const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

/// Consume the 128-byte file preamble and the `DICM` magic code
/// from the given source.
///
/// The contents of the preamble are not inspected.
/// Returns `false` if the magic code does not match
/// or if the source ends before it could be read in full.
/// On success, the source is left at the first element
/// of the file meta group (byte offset 132).
pub fn read_preamble<S>(source: &mut S) -> Result<bool>
where
    S: ?Sized + Read,
{
    let mut preamble = [0u8; PREAMBLE_LENGTH];
    if !read_or_eof(source, &mut preamble).context(ReadPreambleSnafu)? {
        debug!("Source ended within the file preamble");
        return Ok(false);
    }

    let mut magic = [0u8; 4];
    if !read_or_eof(source, &mut magic).context(ReadPreambleSnafu)? {
        debug!("Source ended before the magic code");
        return Ok(false);
    }

    let valid = magic == DICM_MAGIC_CODE;
    debug!("Magic code {:02X?}, valid: {}", magic, valid);
    Ok(valid)
}
