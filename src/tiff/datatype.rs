//! TIFF field datatypes
//!
//! The closed enumeration of the field datatypes defined by the TIFF and
//! BigTIFF specifications. Any other numeric code is rejected with a
//! distinct error so callers can decide whether to drop or fail.

use std::convert::TryFrom;
use std::fmt;

use crate::tiff::errors::TiffError;

/// A TIFF field datatype
///
/// Codes 1-13 come from classic TIFF, 16-18 were added by BigTIFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Datatype {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
    Ifd,
    Long8,
    SLong8,
    Ifd8,
}

/// All datatypes in code order, used for iteration during value parsing
pub const ALL_DATATYPES: [Datatype; 16] = [
    Datatype::Byte,
    Datatype::Ascii,
    Datatype::Short,
    Datatype::Long,
    Datatype::Rational,
    Datatype::SByte,
    Datatype::Undefined,
    Datatype::SShort,
    Datatype::SLong,
    Datatype::SRational,
    Datatype::Float,
    Datatype::Double,
    Datatype::Ifd,
    Datatype::Long8,
    Datatype::SLong8,
    Datatype::Ifd8,
];

impl Datatype {
    /// The numeric code stored in IFD entries
    pub fn code(&self) -> u16 {
        match self {
            Datatype::Byte => 1,
            Datatype::Ascii => 2,
            Datatype::Short => 3,
            Datatype::Long => 4,
            Datatype::Rational => 5,
            Datatype::SByte => 6,
            Datatype::Undefined => 7,
            Datatype::SShort => 8,
            Datatype::SLong => 9,
            Datatype::SRational => 10,
            Datatype::Float => 11,
            Datatype::Double => 12,
            Datatype::Ifd => 13,
            Datatype::Long8 => 16,
            Datatype::SLong8 => 17,
            Datatype::Ifd8 => 18,
        }
    }

    /// Size of one element in bytes
    pub fn size(&self) -> u64 {
        match self {
            Datatype::Byte | Datatype::Ascii | Datatype::SByte | Datatype::Undefined => 1,
            Datatype::Short | Datatype::SShort => 2,
            Datatype::Long | Datatype::SLong | Datatype::Float | Datatype::Ifd => 4,
            Datatype::Rational
            | Datatype::SRational
            | Datatype::Double
            | Datatype::Long8
            | Datatype::SLong8
            | Datatype::Ifd8 => 8,
        }
    }

    /// The canonical name, as used in dumps and in `TAG:DATATYPE` specs
    pub fn name(&self) -> &'static str {
        match self {
            Datatype::Byte => "BYTE",
            Datatype::Ascii => "ASCII",
            Datatype::Short => "SHORT",
            Datatype::Long => "LONG",
            Datatype::Rational => "RATIONAL",
            Datatype::SByte => "SBYTE",
            Datatype::Undefined => "UNDEFINED",
            Datatype::SShort => "SSHORT",
            Datatype::SLong => "SLONG",
            Datatype::SRational => "SRATIONAL",
            Datatype::Float => "FLOAT",
            Datatype::Double => "DOUBLE",
            Datatype::Ifd => "IFD",
            Datatype::Long8 => "LONG8",
            Datatype::SLong8 => "SLONG8",
            Datatype::Ifd8 => "IFD8",
        }
    }

    /// True for the null-terminated string type
    pub fn is_ascii(&self) -> bool {
        matches!(self, Datatype::Ascii)
    }

    /// True for numerator/denominator pair types
    pub fn is_rational(&self) -> bool {
        matches!(self, Datatype::Rational | Datatype::SRational)
    }

    /// True for signed integer types
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Datatype::SByte | Datatype::SShort | Datatype::SLong | Datatype::SRational | Datatype::SLong8
        )
    }

    /// True for types whose elements hold file offsets
    pub fn is_offset_size(&self) -> bool {
        matches!(self, Datatype::Ifd | Datatype::Ifd8 | Datatype::Long8)
    }

    /// True for types that reference nested IFDs
    pub fn is_ifd(&self) -> bool {
        matches!(self, Datatype::Ifd | Datatype::Ifd8)
    }

    /// True for types that only exist in BigTIFF files
    pub fn is_bigtiff_only(&self) -> bool {
        matches!(self, Datatype::Long8 | Datatype::SLong8 | Datatype::Ifd8)
    }

    /// True for floating-point types
    pub fn is_float(&self) -> bool {
        matches!(self, Datatype::Float | Datatype::Double)
    }

    /// Looks up a datatype by its case-insensitive name or numeric code
    pub fn from_name(name: &str) -> Option<Datatype> {
        let upper = name.trim().to_ascii_uppercase();
        if upper == "DWORD" {
            // libtiff alias for LONG
            return Some(Datatype::Long);
        }
        for dt in ALL_DATATYPES {
            if dt.name() == upper {
                return Some(dt);
            }
        }
        crate::utils::string_utils::parse_int(name)
            .filter(|&code| code <= u16::MAX as u64)
            .and_then(|code| Datatype::try_from(code as u16).ok())
    }
}

impl TryFrom<u16> for Datatype {
    type Error = TiffError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Datatype::Byte),
            2 => Ok(Datatype::Ascii),
            3 => Ok(Datatype::Short),
            4 => Ok(Datatype::Long),
            5 => Ok(Datatype::Rational),
            6 => Ok(Datatype::SByte),
            7 => Ok(Datatype::Undefined),
            8 => Ok(Datatype::SShort),
            9 => Ok(Datatype::SLong),
            10 => Ok(Datatype::SRational),
            11 => Ok(Datatype::Float),
            12 => Ok(Datatype::Double),
            13 => Ok(Datatype::Ifd),
            16 => Ok(Datatype::Long8),
            17 => Ok(Datatype::SLong8),
            18 => Ok(Datatype::Ifd8),
            other => Err(TiffError::UnknownDatatype(other)),
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
