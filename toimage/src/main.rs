//! A CLI tool for extracting the encapsulated JPEG frame
//! of a DICOM file into a grayscale PNG image.
use std::path::{Path, PathBuf};

use clap::Parser;
use dcmjpeg_pixeldata::buffer::DEFAULT_CANVAS_SIZE;
use dcmjpeg_pixeldata::{ExtractOptions, OutputShape, PixelBuffer};
use snafu::{OptionExt, Report, ResultExt, Whatever};
use tracing::{error, Level};

/// Extract the JPEG image of a DICOM file
#[derive(Debug, Parser)]
struct App {
    /// Path to the DICOM file to convert
    file: PathBuf,

    /// Path to the output image
    /// (default is to replace input extension with `.png`)
    #[arg(short = 'o', long = "out")]
    output: Option<PathBuf>,

    /// Decode faster, at the expense of accuracy
    #[arg(long = "fast")]
    fast: bool,

    /// Size the output to the decoded frame
    /// instead of a fixed square canvas
    #[arg(long = "decoded-size")]
    decoded_size: bool,

    /// Side of the output canvas,
    /// or the maximum frame side with `--decoded-size`
    #[arg(long = "max-size", default_value_t = DEFAULT_CANVAS_SIZE)]
    max_size: u32,

    /// Print more information about the image and the output file
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl App {
    fn output_shape(&self) -> OutputShape {
        if self.decoded_size {
            OutputShape::Decoded {
                max_columns: self.max_size,
                max_rows: self.max_size,
            }
        } else {
            OutputShape::Fixed {
                columns: self.max_size,
                rows: self.max_size,
            }
        }
    }
}

fn save_png(pixels: PixelBuffer, output: &Path) -> Result<(), Whatever> {
    let (columns, rows) = (pixels.columns(), pixels.rows());
    let image = image::GrayImage::from_raw(columns, rows, pixels.into_vec())
        .whatever_context("Pixel buffer does not match its dimensions")?;
    image
        .save(output)
        .with_whatever_context(|_| format!("Could not save image to {}", output.display()))
}

fn main() {
    let app = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if app.verbose {
                Level::DEBUG
            } else {
                Level::INFO
            })
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    let output = app.output.clone().unwrap_or_else(|| {
        let mut path = app.file.clone();
        path.set_extension("png");
        path
    });

    let pixels = ExtractOptions::new()
        .fast_and_lossy(app.fast)
        .output_shape(app.output_shape())
        .open_file(&app.file)
        .unwrap_or_else(|e| {
            error!("{}", Report::from_error(e));
            std::process::exit(-1);
        });

    if app.verbose {
        println!("{}x{} image, 8-bit", pixels.columns(), pixels.rows());
    }

    save_png(pixels, &output).unwrap_or_else(|e| {
        error!("{}", Report::from_error(e));
        std::process::exit(-2);
    });

    if app.verbose {
        println!("Image saved to {}", output.display());
    }
}
