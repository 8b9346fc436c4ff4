//! This module contains the types needed to interpret the header of a DICOM
//! data element as it appears in an explicit VR little endian stream:
//! the attribute tag, the value representation and the value length,
//! as well as the header of encapsulated pixel data items.

use snafu::{Backtrace, Snafu};
use std::cmp::Ordering;
use std::fmt;
use std::str::{from_utf8, FromStr};

/// Error type for issues constructing an item header.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ItemHeaderError {
    /// Unexpected header tag.
    /// Only Item (0xFFFE, 0xE000),
    /// Item Delimiter (0xFFFE, 0xE00D),
    /// or Sequence Delimiter (0xFFFE, 0xE0DD)
    /// are admitted.
    #[snafu(display("Unexpected tag {}", tag))]
    UnexpectedTag {
        /// the tag found in place of an item header
        tag: Tag,
        /// where the error happened
        backtrace: Backtrace,
    },
    /// Unexpected delimiter value length.
    /// Must be zero for item delimiters.
    #[snafu(display("Unexpected delimiter length {}", len))]
    UnexpectedDelimiterLength {
        /// the declared length of the delimiter
        len: Length,
        /// where the error happened
        backtrace: Backtrace,
    },
}

type Result<T, E = ItemHeaderError> = std::result::Result<T, E>;

/// An attribute tag: a `(group, element)` pair of numbers.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    /// Check whether this tag belongs to the item and delimiter group
    /// (0xFFFE), whose elements never carry a value representation.
    #[inline]
    pub fn is_item_group(self) -> bool {
        self.0 == 0xFFFE
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

/// An enum type for a DICOM value representation.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Very Long
    OV,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Signed Very Long
    SV,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
    /// Unsigned Very Long
    UV,
}

/// The layout of the value length field
/// following the VR in an explicit VR data element header.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum LengthField {
    /// A bare 16-bit length follows the VR.
    Short,
    /// Two reserved bytes follow the VR,
    /// then a 32-bit length.
    Extended,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_string(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    /// The function returns two alphabetic characters in upper case.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_string().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Obtain the layout of the value length field
    /// for data elements of this VR in explicit VR encoding.
    pub fn length_field(self) -> LengthField {
        use VR::*;
        match self {
            // PS3.5 7.1.2: the Value Length Field is the 16-bit unsigned
            // integer following the two byte VR Field
            AE | AS | AT | CS | DA | DS | DT | FL | FD | IS | LO | LT | PN | SH | SL | SS
            | ST | TM | UI | UL | US => LengthField::Short,
            // for all other VRs the 16 bits following the VR field are
            // reserved, then comes a 32-bit Value Length Field
            OB | OD | OF | OL | OV | OW | SQ | SV | UC | UN | UR | UT | UV => {
                LengthField::Extended
            }
        }
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two UTF-8 encoded alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> std::result::Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OV" => Ok(OV),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "SV" => Ok(SV),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            "UV" => Ok(UV),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(VR::to_string(*self))
    }
}

/// The value representation exactly as read from a data source.
///
/// The two raw bytes are kept even when they do not name a known VR,
/// in which case the element is framed with a short length field.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct RawVr {
    bytes: [u8; 2],
    vr: Option<VR>,
}

impl RawVr {
    /// Interpret the two bytes of a VR field.
    pub fn new(bytes: [u8; 2]) -> Self {
        RawVr {
            bytes,
            vr: VR::from_binary(bytes),
        }
    }

    /// The raw bytes of the VR field.
    #[inline]
    pub fn bytes(self) -> [u8; 2] {
        self.bytes
    }

    /// The recognized value representation, if any.
    #[inline]
    pub fn vr(self) -> Option<VR> {
        self.vr
    }

    /// The layout of the length field following this VR.
    pub fn length_field(self) -> LengthField {
        self.vr.map(VR::length_field).unwrap_or(LengthField::Short)
    }
}

impl From<VR> for RawVr {
    fn from(vr: VR) -> Self {
        RawVr {
            bytes: vr.to_bytes(),
            vr: Some(vr),
        }
    }
}

impl fmt::Display for RawVr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.vr {
            Some(vr) => fmt::Display::fmt(&vr, f),
            None => write!(f, "{:02X}{:02X}", self.bytes[0], self.bytes[1]),
        }
    }
}

/// A type for representing data set content length, in bytes.
/// An internal value of `0xFFFF_FFFF` represents an undefined
/// (unspecified) length, which would have to be determined
/// by scanning the content for a delimiter.
///
/// Comparing between at least one undefined length is always `false`.
///
/// ```
/// # use dcmjpeg_core::Length;
/// assert!(Length(16) < Length(64));
/// assert!(Length::UNDEFINED.is_undefined());
/// assert!(!(Length::UNDEFINED == Length::UNDEFINED));
/// ```
#[derive(Clone, Copy)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// A length that is undefined.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Check whether this length is undefined (unknown).
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    /// Returns `None` if it represents an undefined length.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }
}

impl PartialEq<Length> for Length {
    fn eq(&self, rhs: &Length) -> bool {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => false,
            (l1, l2) => l1 == l2,
        }
    }
}

impl PartialOrd<Length> for Length {
    fn partial_cmp(&self, rhs: &Length) -> Option<Ordering> {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => None,
            (l1, l2) => Some(l1.cmp(&l2)),
        }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", &l),
        }
    }
}

/// The header of a single data element, as read from an element stream.
///
/// Only the parts needed to walk the stream are kept:
/// the value itself is either skipped or read separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value Representation, as read
    pub vr: RawVr,
    /// Element length
    pub len: Length,
}

impl ElementHeader {
    /// Create a new data element header with the given properties.
    pub fn new<T: Into<Tag>, V: Into<RawVr>>(tag: T, vr: V, len: Length) -> ElementHeader {
        ElementHeader {
            tag: tag.into(),
            vr: vr.into(),
            len,
        }
    }

    /// Check whether this is the header of an encapsulated pixel data element:
    /// the Pixel Data tag with an undefined length.
    pub fn is_encapsulated_pixeldata(&self) -> bool {
        self.tag == crate::tags::PIXEL_DATA && self.len.is_undefined()
    }
}

impl fmt::Display for ElementHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[group, tag, VR, VL] = [{:x}, {:x}, {}, {}]",
            self.tag.0, self.tag.1, self.vr, self.len
        )
    }
}

/// Data type for describing an item header in an encapsulated
/// pixel data sequence or any other sequence of items.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ItemHeader {
    /// The cursor contains an item.
    Item {
        /// the length of the item in bytes (can be 0xFFFFFFFF if undefined)
        len: Length,
    },
    /// The cursor read an item delimiter.
    ItemDelimiter,
    /// The cursor read a sequence delimiter.
    /// The sequence ends here and should not be read any further.
    SequenceDelimiter,
}

impl ItemHeader {
    /// Create an item header using the element's raw properties.
    /// An error is raised if the given properties do not relate to an
    /// item, an item delimiter or a sequence delimiter.
    pub fn new<T: Into<Tag>>(tag: T, len: Length) -> Result<ItemHeader> {
        match tag.into() {
            Tag(0xFFFE, 0xE000) => Ok(ItemHeader::Item { len }),
            Tag(0xFFFE, 0xE00D) => {
                // delimiters should not have a positive length
                if len != Length(0) {
                    UnexpectedDelimiterLengthSnafu { len }.fail()
                } else {
                    Ok(ItemHeader::ItemDelimiter)
                }
            }
            Tag(0xFFFE, 0xE0DD) => Ok(ItemHeader::SequenceDelimiter),
            tag => UnexpectedTagSnafu { tag }.fail(),
        }
    }
}
