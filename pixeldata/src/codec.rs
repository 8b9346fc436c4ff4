//! The interface between the pixel data extraction process
//! and the block image codec which decodes an embedded frame.
//!
//! The codec is seen purely as a source of scanlines:
//! it is created against a byte stream
//! positioned at the start of the compressed frame,
//! parses its own header,
//! and then produces one row of samples at a time.

use snafu::Snafu;
use std::io::Read;

/// The possible error conditions when decoding an embedded frame.
///
/// Users of this type are free to handle errors based on their variant,
/// but should not make decisions based on the display message,
/// since that is not considered part of the API.
///
/// When no suitable variant is available,
/// the [`Custom`](DecodeError::Custom) variant may be used,
/// easily created with the [`whatever!`](snafu::whatever) macro.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum DecodeError {
    /// A custom error occurred when decoding,
    /// reported as a dynamic error value with a message.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// The frame does not have a single 8-bit sample per pixel.
    #[snafu(display("Unsupported pixel format `{}`", format))]
    UnsupportedPixelFormat { format: String },

    /// A decoding step was requested out of order.
    #[snafu(display("Decoder is not ready to {}", step))]
    OutOfOrder { step: &'static str },

    /// The destination row does not have the frame's width.
    #[snafu(display("Scanline buffer has {} samples, expected {}", got, expected))]
    ScanlineLength { got: usize, expected: usize },
}

/// Type alias for the result of a decoding step.
pub type DecodeResult<T, E = DecodeError> = std::result::Result<T, E>;

/// The speed and quality trade-off of the inverse transform.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum DecodeMode {
    /// Default quality.
    #[default]
    Default,
    /// Fastest decoding, possibly less accurate.
    Fast,
}

impl DecodeMode {
    /// Choose the decode mode from a `fast_and_lossy` flag.
    pub fn from_fast_and_lossy(fast_and_lossy: bool) -> Self {
        if fast_and_lossy {
            DecodeMode::Fast
        } else {
            DecodeMode::Default
        }
    }
}

/// The properties of a frame, as reported by its header.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct FrameInfo {
    /// The frame width, in samples per row
    pub columns: u32,
    /// The frame height, in rows
    pub rows: u32,
    /// The number of samples in each pixel
    pub samples_per_pixel: u16,
    /// The number of bits in each sample
    pub bits_per_sample: u16,
}

/// A decoder of a single frame which produces scanlines.
///
/// The expected call order is
/// [`read_header`](ScanlineDecoder::read_header),
/// optionally [`set_mode`](ScanlineDecoder::set_mode),
/// [`start`](ScanlineDecoder::start),
/// then [`next_scanline`](ScanlineDecoder::next_scanline)
/// until it returns `false`,
/// and [`finish`](ScanlineDecoder::finish).
/// Any resources held by the decoder are released when it is dropped,
/// whether or not decoding went through to the end.
pub trait ScanlineDecoder {
    /// Parse the frame header.
    fn read_header(&mut self) -> DecodeResult<FrameInfo>;

    /// Select the speed and quality trade-off.
    /// Must be called before [`start`](ScanlineDecoder::start) to take effect.
    fn set_mode(&mut self, mode: DecodeMode);

    /// Begin decompressing the frame.
    fn start(&mut self) -> DecodeResult<()>;

    /// Write the next row of samples into `row`,
    /// which must have exactly as many samples as the frame has columns.
    ///
    /// Returns `false` without writing anything
    /// once all rows have been produced.
    fn next_scanline(&mut self, row: &mut [u8]) -> DecodeResult<bool>;

    /// The index of the next row to be produced.
    fn output_scanline(&self) -> u32;

    /// Conclude decoding.
    fn finish(&mut self) -> DecodeResult<()>;
}

/// A block image codec which can create scanline decoders.
pub trait BlockCodec: std::fmt::Debug {
    /// Create a decoder against the given source,
    /// positioned at the start of a compressed frame.
    fn decoder<'r>(&self, source: &'r mut dyn Read) -> Box<dyn ScanlineDecoder + 'r>;
}
