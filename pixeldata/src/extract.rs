//! The extraction process from a DICOM file to a pixel buffer:
//! validation, scanning, and the hand-off
//! of encapsulated pixel data to a block codec.

use crate::buffer::{OutputShape, PixelBuffer};
use crate::codec::{BlockCodec, DecodeError, DecodeMode};
use crate::jpeg::JpegCodec;
use crate::{
    DecodeSnafu, ImageTooLargeSnafu, IncompleteFrameSnafu, InvalidPreambleSnafu,
    OffsetTableSnafu, OpenFileSnafu, ReadPreambleSnafu, Result, ScanSnafu,
};
use dcmjpeg_parser::{read_offset_table, read_preamble, EncapsulatedPixelData, FragmentReader, Scanner};
use snafu::{ensure, OptionExt, ResultExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A builder type for extracting pixel data with additional options.
///
/// # Example
///
/// ```no_run
/// # use dcmjpeg_pixeldata::{ExtractOptions, OutputShape};
/// let pixels = ExtractOptions::new()
///     .fast_and_lossy(true)
///     .output_shape(OutputShape::Decoded { max_columns: 4096, max_rows: 4096 })
///     .open_file("path/to/file.dcm")?;
/// println!("{}x{}", pixels.columns(), pixels.rows());
/// # Result::<(), Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    fast_and_lossy: bool,
    output_shape: OutputShape,
    codec: Arc<dyn BlockCodec + Send + Sync>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            fast_and_lossy: false,
            output_shape: OutputShape::default(),
            codec: Arc::new(JpegCodec),
        }
    }
}

impl ExtractOptions {
    /// Create a new set of options:
    /// default quality decoding into a 1024×1024 canvas
    /// with the JPEG codec.
    pub fn new() -> Self {
        ExtractOptions::default()
    }

    /// Set whether to trade decoding accuracy for speed.
    pub fn fast_and_lossy(mut self, fast_and_lossy: bool) -> Self {
        self.fast_and_lossy = fast_and_lossy;
        self
    }

    /// Set the shape of the output buffer.
    pub fn output_shape(mut self, output_shape: OutputShape) -> Self {
        self.output_shape = output_shape;
        self
    }

    /// Set the block codec for the embedded frame.
    pub fn codec<C>(mut self, codec: C) -> Self
    where
        C: BlockCodec + Send + Sync + 'static,
    {
        self.codec = Arc::new(codec);
        self
    }

    /// Extract the pixel data of the DICOM file at the given path.
    pub fn open_file<P>(&self, path: P) -> Result<PixelBuffer>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file =
            BufReader::new(File::open(path).with_context(|_| OpenFileSnafu { filename: path })?);
        debug!("Reading {}", path.display());
        self.from_reader(file)
    }

    /// Extract the pixel data from a byte source.
    ///
    /// The source must start at the 128-byte file preamble.
    pub fn from_reader<R>(&self, mut source: R) -> Result<PixelBuffer>
    where
        R: Read,
    {
        ensure!(
            read_preamble(&mut source).context(ReadPreambleSnafu)?,
            InvalidPreambleSnafu
        );

        let pixel_data = Scanner::new().scan(&mut source).context(ScanSnafu)?;

        decode_encapsulated(
            &mut source,
            &pixel_data,
            &*self.codec,
            DecodeMode::from_fast_and_lossy(self.fast_and_lossy),
            self.output_shape,
        )
    }
}

/// Decode the frame of encapsulated pixel data into a new buffer.
///
/// The source must be positioned right after
/// the header of the encapsulated pixel data element,
/// as left by the [`Scanner`].
pub fn decode_encapsulated<S>(
    source: &mut S,
    pixel_data: &EncapsulatedPixelData,
    codec: &dyn BlockCodec,
    mode: DecodeMode,
    output_shape: OutputShape,
) -> Result<PixelBuffer>
where
    S: ?Sized + Read,
{
    read_offset_table(source).context(OffsetTableSnafu)?;

    let mut fragments = FragmentReader::new(source);
    let mut decoder = codec.decoder(&mut fragments);

    let info = decoder.read_header().context(DecodeSnafu)?;
    debug!(
        "Frame of {}x{}, {} sample(s) of {} bits",
        info.columns, info.rows, info.samples_per_pixel, info.bits_per_sample
    );
    if info.samples_per_pixel != 1 || info.bits_per_sample != 8 {
        return Err(DecodeError::UnsupportedPixelFormat {
            format: format!(
                "{} sample(s) of {} bits",
                info.samples_per_pixel, info.bits_per_sample
            ),
        })
        .context(DecodeSnafu);
    }

    let declared = &pixel_data.attributes;
    if let (Some(columns), Some(rows)) = (declared.columns, declared.rows) {
        if (u32::from(columns), u32::from(rows)) != (info.columns, info.rows) {
            warn!(
                "Declared image size {}x{} differs from decoded frame size {}x{}",
                columns, rows, info.columns, info.rows
            );
        }
    }
    if let Some(bits_allocated) = declared.bits_allocated {
        if bits_allocated != info.bits_per_sample {
            warn!(
                "Declared {} bits allocated, decoded frame has {} bits per sample",
                bits_allocated, info.bits_per_sample
            );
        }
    }

    let (max_columns, max_rows) = output_shape.max_size();
    ensure!(
        output_shape.fits(info.columns, info.rows),
        ImageTooLargeSnafu {
            columns: info.columns,
            rows: info.rows,
            max_columns,
            max_rows,
        }
    );
    let mut buffer = output_shape.allocate(info.columns, info.rows);

    decoder.set_mode(mode);
    decoder.start().context(DecodeSnafu)?;

    let columns = info.columns as usize;
    while decoder.output_scanline() < info.rows {
        let y = decoder.output_scanline();
        let row = buffer
            .row_prefix_mut(y, columns)
            .context(IncompleteFrameSnafu {
                produced: y,
                rows: info.rows,
            })?;
        let produced = decoder.next_scanline(row).context(DecodeSnafu)?;
        ensure!(
            produced,
            IncompleteFrameSnafu {
                produced: y,
                rows: info.rows,
            }
        );
    }

    decoder.finish().context(DecodeSnafu)?;
    drop(decoder);
    debug!(
        "Decoded {} rows from {} fragment(s)",
        info.rows,
        fragments.fragments_read()
    );

    Ok(buffer)
}
