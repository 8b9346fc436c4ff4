//! Support for JPEG frame decoding via `jpeg-decoder`.

use crate::codec::{
    decode_error, BlockCodec, DecodeMode, DecodeResult, FrameInfo, ScanlineDecoder,
};
use jpeg_decoder::{Decoder, PixelFormat};
use snafu::prelude::*;
use std::io::Read;
use tracing::debug;

/// Block codec for baseline and extended JPEG frames.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JpegCodec;

impl BlockCodec for JpegCodec {
    fn decoder<'r>(&self, source: &'r mut dyn Read) -> Box<dyn ScanlineDecoder + 'r> {
        Box::new(JpegScanlineDecoder::new(source))
    }
}

/// A scanline decoder for a single JPEG frame.
///
/// The underlying decoder produces the whole frame at once
/// when decompression starts,
/// and rows are then handed out one by one.
pub struct JpegScanlineDecoder<R> {
    decoder: Decoder<R>,
    mode: DecodeMode,
    info: Option<FrameInfo>,
    pixels: Option<Vec<u8>>,
    scanline: u32,
}

impl<R> std::fmt::Debug for JpegScanlineDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JpegScanlineDecoder")
            .field("mode", &self.mode)
            .field("info", &self.info)
            .field("scanline", &self.scanline)
            .finish_non_exhaustive()
    }
}

impl<R> JpegScanlineDecoder<R>
where
    R: Read,
{
    /// Create a decoder for the JPEG frame starting at the given source.
    pub fn new(source: R) -> Self {
        JpegScanlineDecoder {
            decoder: Decoder::new(source),
            mode: DecodeMode::Default,
            info: None,
            pixels: None,
            scanline: 0,
        }
    }
}

impl<R> ScanlineDecoder for JpegScanlineDecoder<R>
where
    R: Read,
{
    fn read_header(&mut self) -> DecodeResult<FrameInfo> {
        self.decoder
            .read_info()
            .map_err(|e| Box::new(e) as Box<_>)
            .whatever_context("Could not read JPEG header")?;
        let info = self
            .decoder
            .info()
            .whatever_context("JPEG header is missing frame information")?;

        ensure!(
            matches!(info.pixel_format, PixelFormat::L8),
            decode_error::UnsupportedPixelFormatSnafu {
                format: format!("{:?}", info.pixel_format),
            }
        );

        let info = FrameInfo {
            columns: u32::from(info.width),
            rows: u32::from(info.height),
            samples_per_pixel: 1,
            bits_per_sample: 8,
        };
        self.info = Some(info);
        Ok(info)
    }

    fn set_mode(&mut self, mode: DecodeMode) {
        self.mode = mode;
    }

    fn start(&mut self) -> DecodeResult<()> {
        let info = self.info.context(decode_error::OutOfOrderSnafu {
            step: "start decompression",
        })?;

        if self.mode == DecodeMode::Fast {
            // jpeg-decoder has a single inverse DCT implementation
            debug!("Fast decoding requested, using the only inverse DCT available");
        }

        let pixels = self
            .decoder
            .decode()
            .map_err(|e| Box::new(e) as Box<_>)
            .whatever_context("JPEG decoder failure")?;

        let expected = info.columns as usize * info.rows as usize;
        ensure_whatever!(
            pixels.len() == expected,
            "JPEG decoder produced {} samples, expected {}",
            pixels.len(),
            expected
        );

        self.pixels = Some(pixels);
        self.scanline = 0;
        Ok(())
    }

    fn next_scanline(&mut self, row: &mut [u8]) -> DecodeResult<bool> {
        let (info, pixels) = match (&self.info, &self.pixels) {
            (Some(info), Some(pixels)) => (info, pixels),
            _ => {
                return decode_error::OutOfOrderSnafu {
                    step: "produce scanlines",
                }
                .fail()
            }
        };

        let columns = info.columns as usize;
        ensure!(
            row.len() == columns,
            decode_error::ScanlineLengthSnafu {
                got: row.len(),
                expected: columns,
            }
        );

        if self.scanline >= info.rows {
            return Ok(false);
        }

        let start = self.scanline as usize * columns;
        row.copy_from_slice(&pixels[start..start + columns]);
        self.scanline += 1;
        Ok(true)
    }

    fn output_scanline(&self) -> u32 {
        self.scanline
    }

    fn finish(&mut self) -> DecodeResult<()> {
        let rows = self.info.map(|info| info.rows).unwrap_or(0);
        ensure_whatever!(
            self.pixels.is_some() && self.scanline == rows,
            "Decoding finished after {} of {} rows",
            self.scanline,
            rows
        );
        self.pixels = None;
        Ok(())
    }
}
