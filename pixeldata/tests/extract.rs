//! Test suite for extracting encapsulated JPEG pixel data
//! from synthetic DICOM files.
//!
//! Each file is assembled by hand:
//! preamble, magic code, a few data elements,
//! and a pixel data element with one or more JPEG fragments.

use dcmjpeg_core::{tags, Tag, VR};
use dcmjpeg_pixeldata::{
    open_pixel_data, Error, ErrorKind, ExtractOptions, OutputShape, PixelBuffer,
};
use rstest::rstest;
use std::io::{Cursor, Write};

// fast decoding may deviate from the default,
// but no sample should stray further than this
const MAX_SAMPLE_ERROR: u8 = 8;

const COLUMNS: u16 = 40;
const ROWS: u16 = 24;

/// A grayscale test pattern:
/// a diagonal gradient with a bright square in the middle.
fn test_pattern(columns: u16, rows: u16) -> Vec<u8> {
    let mut samples = Vec::with_capacity(columns as usize * rows as usize);
    for y in 0..rows {
        for x in 0..columns {
            let inside = (x >= columns / 4 && x < columns * 3 / 4)
                && (y >= rows / 4 && y < rows * 3 / 4);
            let v = if inside {
                240
            } else {
                ((u32::from(x) + u32::from(y)) * 4 % 200) as u8
            };
            samples.push(v);
        }
    }
    samples
}

fn encode_jpeg(columns: u16, rows: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    jpeg_encoder::Encoder::new(&mut jpeg, 95)
        .encode(
            &test_pattern(columns, rows),
            columns,
            rows,
            jpeg_encoder::ColorType::Luma,
        )
        .unwrap();
    jpeg
}

/// Decode the JPEG directly, as the reference for the extracted pixels.
fn reference_samples(jpeg: &[u8]) -> Vec<u8> {
    jpeg_decoder::Decoder::new(jpeg).decode().unwrap()
}

/// A builder of DICOM files in Explicit VR Little Endian.
#[derive(Debug, Default)]
struct DicomBuilder {
    data: Vec<u8>,
}

impl DicomBuilder {
    fn new() -> Self {
        let mut data = vec![0u8; 128];
        data.extend_from_slice(b"DICM");
        DicomBuilder { data }
    }

    fn with_magic(magic: &[u8; 4]) -> Self {
        let mut data = vec![0u8; 128];
        data.extend_from_slice(magic);
        DicomBuilder { data }
    }

    fn tag(mut self, tag: Tag) -> Self {
        self.data.extend_from_slice(&tag.0.to_le_bytes());
        self.data.extend_from_slice(&tag.1.to_le_bytes());
        self
    }

    /// An element with a short length field.
    fn short(self, tag: Tag, vr: VR, value: &[u8]) -> Self {
        let mut this = self.tag(tag);
        this.data.extend_from_slice(&vr.to_bytes());
        this.data
            .extend_from_slice(&(value.len() as u16).to_le_bytes());
        this.data.extend_from_slice(value);
        this
    }

    /// The header of an element with an extended length field.
    fn extended_header(self, tag: Tag, vr: VR, len: u32) -> Self {
        let mut this = self.tag(tag);
        this.data.extend_from_slice(&vr.to_bytes());
        this.data.extend_from_slice(&[0, 0]);
        this.data.extend_from_slice(&len.to_le_bytes());
        this
    }

    fn meta(self) -> Self {
        self.short(
            tags::TRANSFER_SYNTAX_UID,
            VR::UI,
            b"1.2.840.10008.1.2.4.50",
        )
        .short(Tag(0x0008, 0x0060), VR::CS, b"MG")
        .extended_header(Tag(0x0009, 0x1001), VR::OB, 6)
        .raw(&[1, 2, 3, 4, 5, 6])
        .short(tags::ROWS, VR::US, &ROWS.to_le_bytes())
        .short(tags::COLUMNS, VR::US, &COLUMNS.to_le_bytes())
    }

    fn item(self, content: &[u8]) -> Self {
        let mut this = self.tag(tags::ITEM);
        this.data
            .extend_from_slice(&(content.len() as u32).to_le_bytes());
        this.data.extend_from_slice(content);
        this
    }

    fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Encapsulated pixel data with an empty offset table,
    /// the frame split into fragments of at most `fragment_size` bytes.
    fn encapsulated(self, jpeg: &[u8], fragment_size: usize) -> Self {
        let mut this = self
            .extended_header(tags::PIXEL_DATA, VR::OB, 0xFFFF_FFFF)
            .item(&[]);
        for fragment in jpeg.chunks(fragment_size) {
            if fragment.len() % 2 == 1 {
                // fragments have an even length,
                // only the last one may need padding
                let mut padded = fragment.to_vec();
                padded.push(0);
                this = this.item(&padded);
            } else {
                this = this.item(fragment);
            }
        }
        this.sequence_delimiter()
    }

    fn sequence_delimiter(self) -> Self {
        self.tag(tags::SEQUENCE_DELIMITER).raw(&[0, 0, 0, 0])
    }

    fn build(self) -> Vec<u8> {
        self.data
    }
}

fn jpeg_file(jpeg: &[u8]) -> Vec<u8> {
    DicomBuilder::new()
        .meta()
        .encapsulated(jpeg, usize::MAX)
        .build()
}

fn extract(data: Vec<u8>) -> Result<PixelBuffer, Error> {
    ExtractOptions::new().from_reader(Cursor::new(data))
}

fn assert_region_matches(buffer: &PixelBuffer, expected: &[u8], columns: usize, rows: usize) {
    for y in 0..rows {
        let row = buffer.row(y as u32).unwrap();
        assert_eq!(
            &row[..columns],
            &expected[y * columns..(y + 1) * columns],
            "row {} differs",
            y
        );
    }
}

#[test]
fn round_trip_into_default_canvas() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let expected = reference_samples(&jpeg);
    let buffer = extract(jpeg_file(&jpeg)).unwrap();

    assert_eq!(buffer.columns(), 1024);
    assert_eq!(buffer.rows(), 1024);
    assert_eq!(buffer.as_slice().len(), 1024 * 1024);

    // The decoded frame occupies the top-left corner with the canvas stride.
    // Reading rows back-to-back at the frame width would mix them up,
    // so this departs from a plain concatenation of scanlines.
    assert_region_matches(&buffer, &expected, COLUMNS as usize, ROWS as usize);

    // everything else stays zero
    for y in 0..1024 {
        let row = buffer.row(y).unwrap();
        let start = if y < u32::from(ROWS) {
            COLUMNS as usize
        } else {
            0
        };
        assert!(row[start..].iter().all(|&v| v == 0), "row {} not clear", y);
    }
}

#[test]
fn round_trip_into_decoded_size() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let expected = reference_samples(&jpeg);
    let buffer = ExtractOptions::new()
        .output_shape(OutputShape::Decoded {
            max_columns: 64,
            max_rows: 64,
        })
        .from_reader(Cursor::new(jpeg_file(&jpeg)))
        .unwrap();

    assert_eq!(buffer.columns(), u32::from(COLUMNS));
    assert_eq!(buffer.rows(), u32::from(ROWS));
    assert_eq!(buffer.into_vec(), expected);
}

#[test]
fn decoded_frame_resembles_source_pattern() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let buffer = extract(jpeg_file(&jpeg)).unwrap();
    // center of the bright square
    let v = buffer
        .get(u32::from(COLUMNS) / 2, u32::from(ROWS) / 2)
        .unwrap();
    assert!(v > 200, "got {}", v);
}

#[rstest]
#[case(2)]
#[case(100)]
#[case(102)]
fn frame_split_across_fragments(#[case] fragment_size: usize) {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let expected = reference_samples(&jpeg);
    let data = DicomBuilder::new()
        .meta()
        .encapsulated(&jpeg, fragment_size)
        .build();
    let buffer = extract(data).unwrap();
    assert_region_matches(&buffer, &expected, COLUMNS as usize, ROWS as usize);
}

#[test]
fn offset_table_with_entries_is_skipped() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let expected = reference_samples(&jpeg);
    let data = DicomBuilder::new()
        .meta()
        .extended_header(tags::PIXEL_DATA, VR::OB, 0xFFFF_FFFF)
        // two offsets: a fixed 16-byte skip would land in the middle of them
        .item(&[0, 0, 0, 0, 0, 0, 0, 0])
        .item(&jpeg)
        .sequence_delimiter()
        .build();
    let buffer = extract(data).unwrap();
    assert_region_matches(&buffer, &expected, COLUMNS as usize, ROWS as usize);
}

#[test]
fn open_file_twice_gives_same_pixels() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&jpeg_file(&jpeg)).unwrap();
    file.flush().unwrap();

    let first = open_pixel_data(file.path()).unwrap();
    let second = open_pixel_data(file.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fast_decoding_within_tolerance_of_default() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let default = extract(jpeg_file(&jpeg)).unwrap();
    let fast = ExtractOptions::new()
        .fast_and_lossy(true)
        .from_reader(Cursor::new(jpeg_file(&jpeg)))
        .unwrap();

    assert_eq!(fast.columns(), default.columns());
    assert_eq!(fast.rows(), default.rows());
    for (got, expected) in fast.as_slice().iter().zip(default.as_slice()) {
        assert!(
            got.abs_diff(*expected) <= MAX_SAMPLE_ERROR,
            "sample {} too far from {}",
            got,
            expected
        );
    }
}

#[rstest]
#[case(*b"DICN")]
#[case(*b"dicm")]
#[case([0, 0, 0, 0])]
fn bad_magic_code_is_format_error(#[case] magic: [u8; 4]) {
    let jpeg = encode_jpeg(16, 16);
    let data = DicomBuilder::with_magic(&magic)
        .meta()
        .encapsulated(&jpeg, usize::MAX)
        .build();
    let err = extract(data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, Error::InvalidPreamble { .. }));
}

#[test]
fn short_file_is_format_error() {
    let err = extract(vec![0; 130]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let err = extract(Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn native_pixel_data_is_format_error() {
    let samples = test_pattern(COLUMNS, ROWS);
    let data = DicomBuilder::new()
        .meta()
        .extended_header(tags::PIXEL_DATA, VR::OB, samples.len() as u32)
        .raw(&samples)
        .build();
    let err = extract(data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        Error::Scan {
            source: dcmjpeg_parser::Error::MissingPixelData { .. },
        }
    ));
}

#[test]
fn undefined_length_sequence_is_unsupported() {
    let jpeg = encode_jpeg(16, 16);
    let data = DicomBuilder::new()
        .meta()
        .extended_header(Tag(0x0008, 0x1140), VR::SQ, 0xFFFF_FFFF)
        .sequence_delimiter()
        .encapsulated(&jpeg, usize::MAX)
        .build();
    let err = extract(data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedElement);
}

#[test]
fn defined_length_sequence_is_skipped() {
    let jpeg = encode_jpeg(16, 16);
    // an SQ element carries a 4-byte length, unlike the other short VRs
    let nested = DicomBuilder::default()
        .item(&[])
        .build();
    let data = DicomBuilder::new()
        .meta()
        .extended_header(Tag(0x0008, 0x1140), VR::SQ, nested.len() as u32)
        .raw(&nested)
        .encapsulated(&jpeg, usize::MAX)
        .build();
    let buffer = extract(data).unwrap();
    assert_eq!(buffer.columns(), 1024);
}

#[test]
fn truncated_within_element_header_is_format_error() {
    let data = DicomBuilder::new().meta().build();
    let full = data.len();
    // three bytes of the next tag
    let data = DicomBuilder::new()
        .meta()
        .raw(&[0xE0, 0x7F, 0x10])
        .build();
    assert_eq!(data.len(), full + 3);
    let err = extract(data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_frame_is_decode_error() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let data = DicomBuilder::new()
        .meta()
        .extended_header(tags::PIXEL_DATA, VR::OB, 0xFFFF_FFFF)
        .item(&[])
        .item(&jpeg[..jpeg.len() / 2])
        .build();
    let err = extract(data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn frame_larger_than_canvas_is_format_error() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let err = ExtractOptions::new()
        .output_shape(OutputShape::Fixed {
            columns: 32,
            rows: 32,
        })
        .from_reader(Cursor::new(jpeg_file(&jpeg)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        Error::ImageTooLarge {
            columns: 40,
            rows: 24,
            max_columns: 32,
            max_rows: 32,
            ..
        }
    ));
}

#[test]
fn frame_larger_than_maximum_is_format_error() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let err = ExtractOptions::new()
        .output_shape(OutputShape::Decoded {
            max_columns: 64,
            max_rows: 16,
        })
        .from_reader(Cursor::new(jpeg_file(&jpeg)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        Error::ImageTooLarge {
            columns: 40,
            rows: 24,
            max_columns: 64,
            max_rows: 16,
            ..
        }
    ));
}

#[test]
fn bad_offset_table_is_format_error() {
    let data = DicomBuilder::new()
        .meta()
        .extended_header(tags::PIXEL_DATA, VR::OB, 0xFFFF_FFFF)
        .tag(tags::ITEM)
        .raw(&0xFFFF_FFF0_u32.to_le_bytes())
        .raw(&[1, 2, 3, 4])
        .build();
    let err = extract(data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        Error::OffsetTable {
            source: dcmjpeg_parser::Error::ReadOffsetTable { .. },
        }
    ));
}

#[test]
fn declared_attributes_do_not_override_frame() {
    let jpeg = encode_jpeg(COLUMNS, ROWS);
    let expected = reference_samples(&jpeg);
    // declared size and depth disagree with the frame
    let data = DicomBuilder::new()
        .short(tags::ROWS, VR::US, &512_u16.to_le_bytes())
        .short(tags::COLUMNS, VR::US, &512_u16.to_le_bytes())
        .short(tags::BITS_ALLOCATED, VR::US, &16_u16.to_le_bytes())
        .encapsulated(&jpeg, usize::MAX)
        .build();
    let buffer = ExtractOptions::new()
        .output_shape(OutputShape::Decoded {
            max_columns: 1024,
            max_rows: 1024,
        })
        .from_reader(Cursor::new(data))
        .unwrap();
    assert_eq!(buffer.columns(), u32::from(COLUMNS));
    assert_eq!(buffer.rows(), u32::from(ROWS));
    assert_eq!(buffer.into_vec(), expected);
}

#[test]
fn missing_file_is_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_pixel_data(dir.path().join("missing.dcm")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Open);
}
