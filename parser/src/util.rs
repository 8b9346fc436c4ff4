use std::io::{self, Read};

/// Fill the buffer from the source,
/// returning `false` if the source ended before the buffer was filled.
pub(crate) fn read_or_eof<S>(source: &mut S, buf: &mut [u8]) -> io::Result<bool>
where
    S: ?Sized + Read,
{
    match source.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
