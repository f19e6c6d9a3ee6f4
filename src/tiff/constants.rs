//! TIFF tag constants and the tag-set registry
//!
//! This module defines the read-only registry that maps numeric tag IDs to
//! descriptors: symbolic names, default datatypes, enum and bitfield
//! vocabularies, nested-IFD markers and offset/bytecount pairings. The
//! registry is built once on first use and never mutated afterwards.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::tiff::datatype::Datatype;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::string_utils;

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// BigTIFF version number (43)
    pub const BIG_TIFF_VERSION: u16 = 43;

    /// BigTIFF offset size (8 bytes)
    pub const BIGTIFF_OFFSET_SIZE: u16 = 8;

    /// Total header length for classic TIFF
    pub const CLASSIC_HEADER_SIZE: u64 = 8;

    /// Total header length for BigTIFF
    pub const BIGTIFF_HEADER_SIZE: u64 = 16;
}

/// Tag IDs referenced directly by the reader, writer and commands
pub mod tags {
    pub const NEW_SUBFILE_TYPE: u16 = 254;
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const COMPRESSION: u16 = 259;
    pub const IMAGE_DESCRIPTION: u16 = 270;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const SUB_IFD: u16 = 330;
    pub const TILE_OFFSETS: u16 = 324;
    pub const TILE_BYTE_COUNTS: u16 = 325;
    pub const JPEG_IF_OFFSET: u16 = 513;
    pub const JPEG_IF_BYTE_COUNT: u16 = 514;
    pub const EXIF_IFD: u16 = 34665;
    pub const GPS_IFD: u16 = 34853;
    pub const INTEROPERABILITY_IFD: u16 = 40965;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
    pub const GEO_DOUBLE_PARAMS: u16 = 34736;
    pub const GEO_ASCII_PARAMS: u16 = 34737;
    pub const NDPI_MCU_STARTS: u16 = 65426;
}

/// Identity of a named tag set inside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TagSetId {
    Tiff,
    Exif,
    Gps,
    Interop,
    GeoKey,
}

/// How the data ranges referenced by an offset tag are sized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bytecounts {
    /// The paired bytecount tag, by canonical name
    Tag(&'static str),
    /// Every referenced range has this fixed length
    Fixed(u64),
}

/// Descriptor for one tag within a tag set
#[derive(Debug)]
pub struct TagDescriptor {
    /// Numeric tag ID
    pub id: u16,
    /// Canonical symbolic name
    pub name: &'static str,
    /// Accepted synonyms for lookup
    pub altnames: &'static [&'static str],
    /// Default datatypes, in preference order
    pub datatypes: &'static [Datatype],
    /// True if the tag's payload references nested IFDs
    pub is_ifd: bool,
    /// Tag set used to resolve names inside nested IFDs
    pub tag_set: Option<TagSetId>,
    /// Offset/bytecount pairing for tags whose values are file offsets
    pub bytecounts: Option<Bytecounts>,
    /// Value-to-name vocabulary
    pub enum_values: &'static [(u64, &'static str)],
    /// Bitmask-to-name vocabulary
    pub bitfield: &'static [(u64, &'static str)],
    /// Subject to the NDPI 32-bit offset overflow fix-up
    pub ndpi_offset: bool,
}

impl TagDescriptor {
    const BASE: TagDescriptor = TagDescriptor {
        id: 0,
        name: "",
        altnames: &[],
        datatypes: &[],
        is_ifd: false,
        tag_set: None,
        bytecounts: None,
        enum_values: &[],
        bitfield: &[],
        ndpi_offset: false,
    };

    /// True if this tag's values are offsets paired with byte counts
    pub fn is_offset_data(&self) -> bool {
        self.bytecounts.is_some()
    }

    /// True if this tag references nested IFDs, either by marker or by
    /// carrying an IFD datatype
    pub fn references_ifds(&self) -> bool {
        self.is_ifd || self.datatypes.iter().any(|dt| dt.is_ifd())
    }

    /// Looks up the vocabulary name for an enum value
    pub fn enum_name(&self, value: u64) -> Option<&'static str> {
        self.enum_values
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, name)| *name)
    }

    /// Names of all bitfield members present in a value
    pub fn bitfield_names(&self, value: u64) -> Vec<&'static str> {
        self.bitfield
            .iter()
            .filter(|(mask, _)| value & mask == *mask && *mask != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

const DT_SHORT: &[Datatype] = &[Datatype::Short];
const DT_LONG: &[Datatype] = &[Datatype::Long];
const DT_SHORT_LONG: &[Datatype] = &[Datatype::Short, Datatype::Long];
const DT_LONG_LONG8: &[Datatype] = &[Datatype::Long, Datatype::Long8];
const DT_STRIP: &[Datatype] = &[Datatype::Short, Datatype::Long, Datatype::Long8];
const DT_ASCII: &[Datatype] = &[Datatype::Ascii];
const DT_RATIONAL: &[Datatype] = &[Datatype::Rational];
const DT_SRATIONAL: &[Datatype] = &[Datatype::SRational];
const DT_BYTE: &[Datatype] = &[Datatype::Byte];
const DT_UNDEFINED: &[Datatype] = &[Datatype::Undefined];
const DT_DOUBLE: &[Datatype] = &[Datatype::Double];
const DT_IFD: &[Datatype] = &[Datatype::Ifd, Datatype::Ifd8];

/// NewSubfileType bit flags
pub const NEW_SUBFILE_TYPE_BITS: &[(u64, &str)] = &[
    (1, "ReducedImage"),
    (2, "Page"),
    (4, "Mask"),
    (8, "Macro"),
    (16, "MRC"),
];

const OLD_SUBFILE_TYPE: &[(u64, &str)] = &[(1, "Image"), (2, "ReducedImage"), (3, "Page")];

/// Compression scheme vocabulary
pub const COMPRESSION: &[(u64, &str)] = &[
    (1, "None"),
    (2, "CCITTRLE"),
    (3, "CCITT_T4"),
    (4, "CCITT_T6"),
    (5, "LZW"),
    (6, "OldJPEG"),
    (7, "JPEG"),
    (8, "AdobeDeflate"),
    (9, "T85"),
    (10, "T43"),
    (32766, "NeXT"),
    (32773, "Packbits"),
    (32809, "Thunderscan"),
    (32946, "Deflate"),
    (33003, "JP2kYCbCr"),
    (33005, "JP2kRGB"),
    (34661, "JBIG"),
    (34676, "SGILOG"),
    (34712, "JP2000"),
    (34887, "LERC"),
    (34925, "LZMA"),
    (50000, "ZSTD"),
    (50001, "WEBP"),
];

/// Compression codes that discard information
pub const LOSSY_COMPRESSIONS: &[u64] = &[6, 7, 33003, 33005, 34712, 34887, 50001];

const PHOTOMETRIC: &[(u64, &str)] = &[
    (0, "MinIsWhite"),
    (1, "MinIsBlack"),
    (2, "RGB"),
    (3, "Palette"),
    (4, "Mask"),
    (5, "Separated"),
    (6, "YCbCr"),
    (8, "CIELab"),
    (9, "ICCLab"),
    (10, "ITULab"),
    (32803, "CFA"),
    (32844, "LogL"),
    (32845, "LogLuv"),
];

const THRESHOLDING: &[(u64, &str)] = &[(1, "Bilevel"), (2, "Halftone"), (3, "ErrorDiffuse")];

const FILL_ORDER: &[(u64, &str)] = &[(1, "MSBToLSB"), (2, "LSBToMSB")];

const ORIENTATION: &[(u64, &str)] = &[
    (1, "TopLeft"),
    (2, "TopRight"),
    (3, "BottomRight"),
    (4, "BottomLeft"),
    (5, "LeftTop"),
    (6, "RightTop"),
    (7, "RightBottom"),
    (8, "LeftBottom"),
];

const PLANAR_CONFIG: &[(u64, &str)] = &[(1, "Chunky"), (2, "Planar")];

const T4_OPTIONS_BITS: &[(u64, &str)] = &[(1, "2DEncoding"), (2, "Uncompressed"), (4, "FillBits")];

const T6_OPTIONS_BITS: &[(u64, &str)] = &[(2, "Uncompressed")];

const RESOLUTION_UNIT: &[(u64, &str)] = &[(1, "None"), (2, "Inch"), (3, "Centimeter")];

const PREDICTOR: &[(u64, &str)] = &[(1, "None"), (2, "Horizontal"), (3, "FloatingPoint")];

const CLEAN_FAX_DATA: &[(u64, &str)] = &[(0, "All"), (1, "Regenerated"), (2, "Present")];

const INK_SET: &[(u64, &str)] = &[(1, "CMYK"), (2, "NotCMYK")];

const EXTRA_SAMPLES: &[(u64, &str)] = &[
    (0, "Unspecified"),
    (1, "AssociatedAlpha"),
    (2, "UnassociatedAlpha"),
];

const SAMPLE_FORMAT: &[(u64, &str)] = &[
    (1, "uint"),
    (2, "int"),
    (3, "float"),
    (4, "Undefined"),
    (5, "ComplexInt"),
    (6, "ComplexFloat"),
];

const INDEXED: &[(u64, &str)] = &[(0, "NotIndexed"), (1, "Indexed")];

const JPEG_PROC: &[(u64, &str)] = &[(1, "Baseline"), (2, "LosslessHuffman")];

const YCBCR_POSITIONING: &[(u64, &str)] = &[(1, "Centered"), (2, "Cosited")];

type TD = TagDescriptor;

static TIFF_DESCRIPTORS: &[TagDescriptor] = &[
    TD { id: 254, name: "NewSubfileType", altnames: &["SubfileType"], datatypes: DT_LONG, bitfield: NEW_SUBFILE_TYPE_BITS, ..TD::BASE },
    TD { id: 255, name: "OldSubfileType", datatypes: DT_SHORT, enum_values: OLD_SUBFILE_TYPE, ..TD::BASE },
    TD { id: 256, name: "ImageWidth", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 257, name: "ImageLength", altnames: &["ImageHeight"], datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 258, name: "BitsPerSample", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 259, name: "Compression", datatypes: DT_SHORT, enum_values: COMPRESSION, ..TD::BASE },
    TD { id: 262, name: "Photometric", altnames: &["PhotometricInterpretation"], datatypes: DT_SHORT, enum_values: PHOTOMETRIC, ..TD::BASE },
    TD { id: 263, name: "Threshholding", altnames: &["Thresholding"], datatypes: DT_SHORT, enum_values: THRESHOLDING, ..TD::BASE },
    TD { id: 264, name: "CellWidth", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 265, name: "CellLength", altnames: &["CellHeight"], datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 266, name: "FillOrder", datatypes: DT_SHORT, enum_values: FILL_ORDER, ..TD::BASE },
    TD { id: 269, name: "DocumentName", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 270, name: "ImageDescription", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 271, name: "Make", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 272, name: "Model", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 273, name: "StripOffsets", datatypes: DT_STRIP, bytecounts: Some(Bytecounts::Tag("StripByteCounts")), ndpi_offset: true, ..TD::BASE },
    TD { id: 274, name: "Orientation", datatypes: DT_SHORT, enum_values: ORIENTATION, ..TD::BASE },
    TD { id: 277, name: "SamplesPerPixel", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 278, name: "RowsPerStrip", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 279, name: "StripByteCounts", datatypes: DT_STRIP, ndpi_offset: true, ..TD::BASE },
    TD { id: 280, name: "MinSampleValue", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 281, name: "MaxSampleValue", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 282, name: "XResolution", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 283, name: "YResolution", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 284, name: "PlanarConfig", altnames: &["PlanarConfiguration"], datatypes: DT_SHORT, enum_values: PLANAR_CONFIG, ..TD::BASE },
    TD { id: 285, name: "PageName", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 286, name: "Xposition", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 287, name: "Yposition", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 288, name: "FreeOffsets", datatypes: DT_LONG_LONG8, bytecounts: Some(Bytecounts::Tag("FreeByteCounts")), ..TD::BASE },
    TD { id: 289, name: "FreeByteCounts", datatypes: DT_LONG_LONG8, ..TD::BASE },
    TD { id: 290, name: "GrayResponseUnit", altnames: &["GreyResponseUnit"], datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 291, name: "GrayResponseCurve", altnames: &["GreyResponseCurve"], datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 292, name: "T4Options", altnames: &["Group3Options"], datatypes: DT_LONG, bitfield: T4_OPTIONS_BITS, ..TD::BASE },
    TD { id: 293, name: "T6Options", altnames: &["Group4Options"], datatypes: DT_LONG, bitfield: T6_OPTIONS_BITS, ..TD::BASE },
    TD { id: 296, name: "ResolutionUnit", datatypes: DT_SHORT, enum_values: RESOLUTION_UNIT, ..TD::BASE },
    TD { id: 297, name: "PageNumber", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 301, name: "TransferFunction", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 305, name: "Software", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 306, name: "DateTime", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 315, name: "Artist", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 316, name: "HostComputer", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 317, name: "Predictor", datatypes: DT_SHORT, enum_values: PREDICTOR, ..TD::BASE },
    TD { id: 318, name: "WhitePoint", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 319, name: "PrimaryChromaticities", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 320, name: "ColorMap", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 321, name: "HalftoneHints", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 322, name: "TileWidth", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 323, name: "TileLength", altnames: &["TileHeight"], datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 324, name: "TileOffsets", datatypes: DT_LONG_LONG8, bytecounts: Some(Bytecounts::Tag("TileByteCounts")), ..TD::BASE },
    TD { id: 325, name: "TileByteCounts", datatypes: DT_LONG_LONG8, ..TD::BASE },
    TD { id: 326, name: "BadFaxLines", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 327, name: "CleanFaxData", datatypes: DT_SHORT, enum_values: CLEAN_FAX_DATA, ..TD::BASE },
    TD { id: 328, name: "ConsecutiveBadFaxLines", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 330, name: "SubIFD", datatypes: DT_IFD, is_ifd: true, tag_set: Some(TagSetId::Tiff), ..TD::BASE },
    TD { id: 332, name: "InkSet", datatypes: DT_SHORT, enum_values: INK_SET, ..TD::BASE },
    TD { id: 333, name: "InkNames", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 334, name: "NumberOfInks", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 336, name: "DotRange", datatypes: &[Datatype::Byte, Datatype::Short], ..TD::BASE },
    TD { id: 337, name: "TargetPrinter", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 338, name: "ExtraSamples", datatypes: DT_SHORT, enum_values: EXTRA_SAMPLES, ..TD::BASE },
    TD { id: 339, name: "SampleFormat", datatypes: DT_SHORT, enum_values: SAMPLE_FORMAT, ..TD::BASE },
    TD { id: 340, name: "SMinSampleValue", ..TD::BASE },
    TD { id: 341, name: "SMaxSampleValue", ..TD::BASE },
    TD { id: 343, name: "ClipPath", datatypes: DT_BYTE, ..TD::BASE },
    TD { id: 344, name: "XClipPathUnits", datatypes: DT_LONG, ..TD::BASE },
    TD { id: 345, name: "YClipPathUnits", datatypes: DT_LONG, ..TD::BASE },
    TD { id: 346, name: "Indexed", datatypes: DT_SHORT, enum_values: INDEXED, ..TD::BASE },
    TD { id: 347, name: "JPEGTables", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 351, name: "OpiProxy", ..TD::BASE },
    TD { id: 400, name: "GlobalParametersIFD", datatypes: DT_IFD, is_ifd: true, tag_set: Some(TagSetId::Tiff), ..TD::BASE },
    TD { id: 401, name: "ProfileType", ..TD::BASE },
    TD { id: 402, name: "FaxProfile", ..TD::BASE },
    TD { id: 403, name: "CodingMethods", ..TD::BASE },
    TD { id: 404, name: "VersionYear", ..TD::BASE },
    TD { id: 405, name: "ModeNumber", ..TD::BASE },
    TD { id: 433, name: "Decode", ..TD::BASE },
    TD { id: 434, name: "ImageBaseColor", ..TD::BASE },
    TD { id: 512, name: "JPEGProc", datatypes: DT_SHORT, enum_values: JPEG_PROC, ..TD::BASE },
    TD { id: 513, name: "JPEGIFOffset", altnames: &["JPEGInterchangeFormat"], datatypes: DT_LONG_LONG8, bytecounts: Some(Bytecounts::Tag("JPEGIFByteCount")), ..TD::BASE },
    TD { id: 514, name: "JPEGIFByteCount", altnames: &["JPEGInterchangeFormatLength"], datatypes: DT_LONG_LONG8, ..TD::BASE },
    TD { id: 515, name: "JPEGRestartInterval", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 517, name: "JPEGLosslessPredictors", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 518, name: "JPEGPointTransform", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 519, name: "JPEGQTables", datatypes: DT_LONG_LONG8, bytecounts: Some(Bytecounts::Fixed(64)), ..TD::BASE },
    TD { id: 520, name: "JPEGDCTables", datatypes: DT_LONG_LONG8, bytecounts: Some(Bytecounts::Fixed(33)), ..TD::BASE },
    TD { id: 521, name: "JPEGACTables", datatypes: DT_LONG_LONG8, bytecounts: Some(Bytecounts::Fixed(272)), ..TD::BASE },
    TD { id: 529, name: "YCbCrCoefficients", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 530, name: "YCbCrSubsampling", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 531, name: "YCbCrPositioning", datatypes: DT_SHORT, enum_values: YCBCR_POSITIONING, ..TD::BASE },
    TD { id: 532, name: "ReferenceBlackWhite", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 559, name: "StripRowCounts", datatypes: DT_LONG, ..TD::BASE },
    TD { id: 700, name: "XMLPacket", altnames: &["XMP"], ..TD::BASE },
    TD { id: 32781, name: "OPIImageID", ..TD::BASE },
    TD { id: 32932, name: "WangAnnotation", ..TD::BASE },
    TD { id: 32995, name: "Matteing", ..TD::BASE },
    TD { id: 32996, name: "Datatype", ..TD::BASE },
    TD { id: 32997, name: "ImageDepth", ..TD::BASE },
    TD { id: 32998, name: "TileDepth", ..TD::BASE },
    TD { id: 33432, name: "Copyright", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 33550, name: "ModelPixelScaleTag", altnames: &["ModelPixelScale"], datatypes: DT_DOUBLE, ..TD::BASE },
    TD { id: 33723, name: "RichTiffIPTC", ..TD::BASE },
    TD { id: 33922, name: "ModelTiepointTag", altnames: &["ModelTiepoint"], datatypes: DT_DOUBLE, ..TD::BASE },
    TD { id: 34016, name: "IT8Site", ..TD::BASE },
    TD { id: 34017, name: "IT8ColorSequence", ..TD::BASE },
    TD { id: 34018, name: "IT8Header", ..TD::BASE },
    TD { id: 34264, name: "ModelTransformationTag", altnames: &["ModelTransformation"], datatypes: DT_DOUBLE, ..TD::BASE },
    TD { id: 34377, name: "Photoshop", ..TD::BASE },
    TD { id: 34665, name: "EXIFIFD", altnames: &["ExifIFD"], datatypes: DT_IFD, is_ifd: true, tag_set: Some(TagSetId::Exif), ..TD::BASE },
    TD { id: 34675, name: "ICCProfile", ..TD::BASE },
    TD { id: 34735, name: "GeoKeyDirectoryTag", altnames: &["GeoKeyDirectory"], datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 34736, name: "GeoDoubleParamsTag", altnames: &["GeoDoubleParams"], datatypes: DT_DOUBLE, ..TD::BASE },
    TD { id: 34737, name: "GeoAsciiParamsTag", altnames: &["GeoAsciiParams"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 34853, name: "GPSIFD", altnames: &["GpsIFD"], datatypes: DT_IFD, is_ifd: true, tag_set: Some(TagSetId::Gps), ..TD::BASE },
    TD { id: 34908, name: "FaxRecvParams", ..TD::BASE },
    TD { id: 34909, name: "FaxSubaddress", ..TD::BASE },
    TD { id: 34910, name: "FaxRecvTime", ..TD::BASE },
    TD { id: 37439, name: "StoNits", ..TD::BASE },
    TD { id: 37724, name: "ImageSourceData", ..TD::BASE },
    TD { id: 40965, name: "InteroperabilityIFD", altnames: &["InteropIFD"], datatypes: DT_IFD, is_ifd: true, tag_set: Some(TagSetId::Interop), ..TD::BASE },
    TD { id: 42112, name: "GDAL_Metadata", altnames: &["GDALMetadata"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42113, name: "GDAL_NoData", altnames: &["GDALNoData"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 50674, name: "LERC_PARAMETERS", ..TD::BASE },
    TD { id: 50706, name: "DNGVersion", ..TD::BASE },
    TD { id: 50707, name: "DNGBackwardVersion", ..TD::BASE },
    TD { id: 50708, name: "UniqueCameraModel", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 50709, name: "LocalizedCameraModel", ..TD::BASE },
    TD { id: 50712, name: "LinearizationTable", ..TD::BASE },
    TD { id: 50714, name: "BlackLevel", ..TD::BASE },
    TD { id: 50717, name: "WhiteLevel", ..TD::BASE },
    TD { id: 50721, name: "ColorMatrix1", ..TD::BASE },
    TD { id: 50722, name: "ColorMatrix2", ..TD::BASE },
    TD { id: 50727, name: "AnalogBalance", ..TD::BASE },
    TD { id: 50728, name: "AsShotNeutral", ..TD::BASE },
    TD { id: 50730, name: "BaselineExposure", ..TD::BASE },
    TD { id: 50735, name: "CameraSerialNumber", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 50740, name: "DNGPrivateData", ..TD::BASE },
    TD { id: 50778, name: "CalibrationIlluminant1", ..TD::BASE },
    TD { id: 50779, name: "CalibrationIlluminant2", ..TD::BASE },
    TD { id: 50829, name: "ActiveArea", ..TD::BASE },
    TD { id: 50908, name: "TIFF_RSID", ..TD::BASE },
    TD { id: 50909, name: "GEO_METADATA", ..TD::BASE },
    // Hamamatsu NDPI vendor tags
    TD { id: 65420, name: "NDPI_FORMAT_FLAG", ..TD::BASE },
    TD { id: 65421, name: "NDPI_SOURCELENS", ..TD::BASE },
    TD { id: 65422, name: "NDPI_XOFFSET", ..TD::BASE },
    TD { id: 65423, name: "NDPI_YOFFSET", ..TD::BASE },
    TD { id: 65424, name: "NDPI_FOCAL_PLANE", ..TD::BASE },
    TD { id: 65426, name: "NDPI_MCU_STARTS", ndpi_offset: true, ..TD::BASE },
    TD { id: 65427, name: "NDPI_REFERENCE", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 65442, name: "NDPI_NDPSN", ..TD::BASE },
    TD { id: 65449, name: "NDPI_PROPERTY_MAP", ..TD::BASE },
    TD { id: 65535, name: "DCSHUESHIFTVALUES", ..TD::BASE },
];

static EXIF_DESCRIPTORS: &[TagDescriptor] = &[
    TD { id: 33434, name: "ExposureTime", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 33437, name: "FNumber", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 34850, name: "ExposureProgram", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 34852, name: "SpectralSensitivity", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 34855, name: "ISOSpeedRatings", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 34856, name: "OECF", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 34858, name: "TimeZoneOffset", datatypes: &[Datatype::SShort], ..TD::BASE },
    TD { id: 34865, name: "StandardOutputSensitivity", datatypes: DT_LONG, ..TD::BASE },
    TD { id: 34866, name: "RecommendedExposureIndex", datatypes: DT_LONG, ..TD::BASE },
    TD { id: 36864, name: "ExifVersion", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 36867, name: "DateTimeOriginal", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 36868, name: "CreateDate", altnames: &["DateTimeDigitized"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 36880, name: "OffsetTime", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 36881, name: "OffsetTimeOriginal", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 36882, name: "OffsetTimeDigitized", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 37121, name: "ComponentsConfiguration", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 37122, name: "CompressedBitsPerPixel", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 37377, name: "ShutterSpeedValue", datatypes: DT_SRATIONAL, ..TD::BASE },
    TD { id: 37378, name: "ApertureValue", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 37379, name: "BrightnessValue", datatypes: DT_SRATIONAL, ..TD::BASE },
    TD { id: 37380, name: "ExposureBiasValue", datatypes: DT_SRATIONAL, ..TD::BASE },
    TD { id: 37381, name: "MaxApertureValue", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 37382, name: "SubjectDistance", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 37383, name: "MeteringMode", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 37384, name: "LightSource", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 37385, name: "Flash", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 37386, name: "FocalLength", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 37393, name: "ImageNumber", datatypes: DT_LONG, ..TD::BASE },
    TD { id: 37396, name: "SubjectArea", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 37500, name: "MakerNote", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 37510, name: "UserComment", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 37520, name: "SubSecTime", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 37521, name: "SubSecTimeOriginal", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 37522, name: "SubSecTimeDigitized", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 40960, name: "FlashpixVersion", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 40961, name: "ColorSpace", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 40962, name: "PixelXDimension", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 40963, name: "PixelYDimension", datatypes: DT_SHORT_LONG, ..TD::BASE },
    TD { id: 41486, name: "FocalPlaneXResolution", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 41487, name: "FocalPlaneYResolution", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 41488, name: "FocalPlaneResolutionUnit", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41492, name: "SubjectLocation", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41493, name: "ExposureIndex", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 41495, name: "SensingMethod", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41728, name: "FileSource", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 41729, name: "SceneType", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 41730, name: "CFAPattern", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 41985, name: "CustomRendered", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41986, name: "ExposureMode", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41987, name: "WhiteBalance", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41988, name: "DigitalZoomRatio", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 41989, name: "FocalLengthIn35mmFilm", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41990, name: "SceneCaptureType", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41991, name: "GainControl", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 41992, name: "Contrast", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41993, name: "Saturation", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41994, name: "Sharpness", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 41996, name: "SubjectDistanceRange", datatypes: DT_SHORT, ..TD::BASE },
    TD { id: 42016, name: "ImageUniqueID", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42032, name: "OwnerName", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42033, name: "SerialNumber", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42034, name: "LensInfo", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 42035, name: "LensMake", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42036, name: "LensModel", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42037, name: "LensSerialNumber", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 42240, name: "Gamma", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 59932, name: "Padding", ..TD::BASE },
    TD { id: 59933, name: "OffsetSchema", datatypes: &[Datatype::SLong], ..TD::BASE },
];

static GPS_DESCRIPTORS: &[TagDescriptor] = &[
    TD { id: 0, name: "GPSVersionID", datatypes: DT_BYTE, ..TD::BASE },
    TD { id: 1, name: "GPSLatitudeRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 2, name: "GPSLatitude", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 3, name: "GPSLongitudeRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 4, name: "GPSLongitude", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 5, name: "GPSAltitudeRef", datatypes: DT_BYTE, ..TD::BASE },
    TD { id: 6, name: "GPSAltitude", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 7, name: "GPSTimeStamp", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 8, name: "GPSSatellites", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 9, name: "GPSStatus", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 10, name: "GPSMeasureMode", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 11, name: "GPSDOP", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 12, name: "GPSSpeedRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 13, name: "GPSSpeed", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 14, name: "GPSTrackRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 15, name: "GPSTrack", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 16, name: "GPSImgDirectionRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 17, name: "GPSImgDirection", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 18, name: "GPSMapDatum", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 19, name: "GPSDestLatitudeRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 20, name: "GPSDestLatitude", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 21, name: "GPSDestLongitudeRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 22, name: "GPSDestLongitude", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 23, name: "GPSDestBearingRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 24, name: "GPSDestBearing", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 25, name: "GPSDestDistanceRef", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 26, name: "GPSDestDistance", datatypes: DT_RATIONAL, ..TD::BASE },
    TD { id: 27, name: "GPSProcessingMethod", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 28, name: "GPSAreaInformation", datatypes: DT_UNDEFINED, ..TD::BASE },
    TD { id: 29, name: "GPSDateStamp", datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 30, name: "GPSDifferential", datatypes: DT_SHORT, ..TD::BASE },
];

static INTEROP_DESCRIPTORS: &[TagDescriptor] = &[
    TD { id: 1, name: "InteroperabilityIndex", datatypes: DT_ASCII, ..TD::BASE },
];

// GeoKey IDs are pseudo-tags stored inside the GeoKeyDirectory payload.
static GEO_KEY_DESCRIPTORS: &[TagDescriptor] = &[
    TD { id: 1024, name: "GTModelType", altnames: &["GTModelTypeGeoKey"], ..TD::BASE },
    TD { id: 1025, name: "GTRasterType", altnames: &["GTRasterTypeGeoKey"], ..TD::BASE },
    TD { id: 1026, name: "GTCitation", altnames: &["GTCitationGeoKey"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 2048, name: "GeographicType", altnames: &["GeographicTypeGeoKey"], ..TD::BASE },
    TD { id: 2049, name: "GeogCitation", altnames: &["GeogCitationGeoKey"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 2050, name: "GeogGeodeticDatum", altnames: &["GeogGeodeticDatumGeoKey"], ..TD::BASE },
    TD { id: 2051, name: "GeogPrimeMeridian", altnames: &["GeogPrimeMeridianGeoKey"], ..TD::BASE },
    TD { id: 2052, name: "GeogLinearUnits", altnames: &["GeogLinearUnitsGeoKey"], ..TD::BASE },
    TD { id: 2053, name: "GeogLinearUnitSize", altnames: &["GeogLinearUnitSizeGeoKey"], ..TD::BASE },
    TD { id: 2054, name: "GeogAngularUnits", altnames: &["GeogAngularUnitsGeoKey"], ..TD::BASE },
    TD { id: 2055, name: "GeogAngularUnitSize", altnames: &["GeogAngularUnitSizeGeoKey"], ..TD::BASE },
    TD { id: 2056, name: "GeogEllipsoid", altnames: &["GeogEllipsoidGeoKey"], ..TD::BASE },
    TD { id: 2057, name: "GeogSemiMajorAxis", altnames: &["GeogSemiMajorAxisGeoKey"], ..TD::BASE },
    TD { id: 2058, name: "GeogSemiMinorAxis", altnames: &["GeogSemiMinorAxisGeoKey"], ..TD::BASE },
    TD { id: 2059, name: "GeogInvFlattening", altnames: &["GeogInvFlatteningGeoKey"], ..TD::BASE },
    TD { id: 2060, name: "GeogAzimuthUnits", altnames: &["GeogAzimuthUnitsGeoKey"], ..TD::BASE },
    TD { id: 2061, name: "GeogPrimeMeridianLong", altnames: &["GeogPrimeMeridianLongGeoKey"], ..TD::BASE },
    TD { id: 2062, name: "GeogTOWGS84", altnames: &["GeogTOWGS84GeoKey"], ..TD::BASE },
    TD { id: 3072, name: "ProjectedCSType", altnames: &["ProjectedCSTypeGeoKey"], ..TD::BASE },
    TD { id: 3073, name: "PCSCitation", altnames: &["PCSCitationGeoKey"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 3074, name: "Projection", altnames: &["ProjectionGeoKey"], ..TD::BASE },
    TD { id: 3075, name: "ProjCoordTrans", altnames: &["ProjCoordTransGeoKey"], ..TD::BASE },
    TD { id: 3076, name: "ProjLinearUnits", altnames: &["ProjLinearUnitsGeoKey"], ..TD::BASE },
    TD { id: 3077, name: "ProjLinearUnitSize", altnames: &["ProjLinearUnitSizeGeoKey"], ..TD::BASE },
    TD { id: 3078, name: "ProjStdParallel1", altnames: &["ProjStdParallel1GeoKey", "ProjStdParallel"], ..TD::BASE },
    TD { id: 3079, name: "ProjStdParallel2", altnames: &["ProjStdParallel2GeoKey"], ..TD::BASE },
    TD { id: 3080, name: "ProjNatOriginLong", altnames: &["ProjNatOriginLongGeoKey", "ProjOriginLong"], ..TD::BASE },
    TD { id: 3081, name: "ProjNatOriginLat", altnames: &["ProjNatOriginLatGeoKey", "ProjOriginLat"], ..TD::BASE },
    TD { id: 3082, name: "ProjFalseEasting", altnames: &["ProjFalseEastingGeoKey"], ..TD::BASE },
    TD { id: 3083, name: "ProjFalseNorthing", altnames: &["ProjFalseNorthingGeoKey"], ..TD::BASE },
    TD { id: 3084, name: "ProjFalseOriginLong", altnames: &["ProjFalseOriginLongGeoKey"], ..TD::BASE },
    TD { id: 3085, name: "ProjFalseOriginLat", altnames: &["ProjFalseOriginLatGeoKey"], ..TD::BASE },
    TD { id: 3086, name: "ProjFalseOriginEasting", altnames: &["ProjFalseOriginEastingGeoKey"], ..TD::BASE },
    TD { id: 3087, name: "ProjFalseOriginNorthing", altnames: &["ProjFalseOriginNorthingGeoKey"], ..TD::BASE },
    TD { id: 3088, name: "ProjCenterLong", altnames: &["ProjCenterLongGeoKey"], ..TD::BASE },
    TD { id: 3089, name: "ProjCenterLat", altnames: &["ProjCenterLatGeoKey"], ..TD::BASE },
    TD { id: 3090, name: "ProjCenterEasting", altnames: &["ProjCenterEastingGeoKey"], ..TD::BASE },
    TD { id: 3091, name: "ProjCenterNorthing", altnames: &["ProjCenterNorthingGeoKey"], ..TD::BASE },
    TD { id: 3092, name: "ProjScaleAtNatOrigin", altnames: &["ProjScaleAtNatOriginGeoKey", "ProjScaleAtOrigin"], ..TD::BASE },
    TD { id: 3093, name: "ProjScaleAtCenter", altnames: &["ProjScaleAtCenterGeoKey"], ..TD::BASE },
    TD { id: 3094, name: "ProjAzimuthAngle", altnames: &["ProjAzimuthAngleGeoKey"], ..TD::BASE },
    TD { id: 3095, name: "ProjStraightVertPoleLong", altnames: &["ProjStraightVertPoleLongGeoKey"], ..TD::BASE },
    TD { id: 3096, name: "ProjRectifiedGridAngle", altnames: &["ProjRectifiedGridAngleGeoKey"], ..TD::BASE },
    TD { id: 4096, name: "VerticalCSType", altnames: &["VerticalCSTypeGeoKey"], ..TD::BASE },
    TD { id: 4097, name: "VerticalCitation", altnames: &["VerticalCitationGeoKey"], datatypes: DT_ASCII, ..TD::BASE },
    TD { id: 4098, name: "VerticalDatum", altnames: &["VerticalDatumGeoKey"], ..TD::BASE },
    TD { id: 4099, name: "VerticalUnits", altnames: &["VerticalUnitsGeoKey"], ..TD::BASE },
    TD { id: 5120, name: "CoordinateEpoch", altnames: &["CoordinateEpochGeoKey"], ..TD::BASE },
];

/// A named collection of tag descriptors with fast id and name lookup
pub struct TagSet {
    pub id: TagSetId,
    pub name: &'static str,
    descriptors: &'static [TagDescriptor],
    by_id: HashMap<u16, &'static TagDescriptor>,
    by_name: HashMap<String, &'static TagDescriptor>,
}

impl TagSet {
    fn new(id: TagSetId, name: &'static str, descriptors: &'static [TagDescriptor]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for desc in descriptors {
            by_id.insert(desc.id, desc);
            by_name.insert(desc.name.to_ascii_lowercase(), desc);
            for alt in desc.altnames {
                by_name.insert(alt.to_ascii_lowercase(), desc);
            }
        }
        TagSet {
            id,
            name,
            descriptors,
            by_id,
            by_name,
        }
    }

    /// Looks up a descriptor by numeric tag ID
    pub fn by_id(&self, tag: u16) -> Option<&'static TagDescriptor> {
        self.by_id.get(&tag).copied()
    }

    /// Looks up a descriptor by case-insensitive name or altname
    pub fn by_name(&self, name: &str) -> Option<&'static TagDescriptor> {
        self.by_name.get(&name.trim().to_ascii_lowercase()).copied()
    }

    /// Iterates over descriptors in ID order
    pub fn iter(&self) -> impl Iterator<Item = &'static TagDescriptor> {
        let mut all: Vec<&'static TagDescriptor> = self.descriptors.iter().collect();
        all.sort_by_key(|d| d.id);
        all.into_iter()
    }

    /// The display name of a tag in this set, falling back to the number
    pub fn tag_name(&self, tag: u16) -> String {
        match self.by_id(tag) {
            Some(desc) => desc.name.to_string(),
            None => format!("{}", tag),
        }
    }
}

lazy_static! {
    static ref TIFF_SET: TagSet = TagSet::new(TagSetId::Tiff, "TIFF", TIFF_DESCRIPTORS);
    static ref EXIF_SET: TagSet = TagSet::new(TagSetId::Exif, "EXIF", EXIF_DESCRIPTORS);
    static ref GPS_SET: TagSet = TagSet::new(TagSetId::Gps, "GPS", GPS_DESCRIPTORS);
    static ref INTEROP_SET: TagSet =
        TagSet::new(TagSetId::Interop, "Interoperability", INTEROP_DESCRIPTORS);
    static ref GEO_KEY_SET: TagSet = TagSet::new(TagSetId::GeoKey, "GeoKey", GEO_KEY_DESCRIPTORS);
}

/// Returns the tag set for an identity
pub fn tag_set(id: TagSetId) -> &'static TagSet {
    match id {
        TagSetId::Tiff => &TIFF_SET,
        TagSetId::Exif => &EXIF_SET,
        TagSetId::Gps => &GPS_SET,
        TagSetId::Interop => &INTEROP_SET,
        TagSetId::GeoKey => &GEO_KEY_SET,
    }
}

/// All registered tag sets, in symbolic lookup fallback order
pub fn all_tag_sets() -> [&'static TagSet; 5] {
    [&TIFF_SET, &EXIF_SET, &GPS_SET, &INTEROP_SET, &GEO_KEY_SET]
}

/// Resolves a symbolic or numeric tag spec against a primary tag set
///
/// Resolution order: name in the primary set, name in any registered set,
/// then numeric (`0x…` or decimal). Numeric values must stay below 65536.
pub fn resolve_tag(
    spec: &str,
    primary: &'static TagSet,
) -> TiffResult<(u16, Option<&'static TagDescriptor>)> {
    if let Some(desc) = primary.by_name(spec) {
        return Ok((desc.id, Some(desc)));
    }
    for set in all_tag_sets() {
        if let Some(desc) = set.by_name(spec) {
            return Ok((desc.id, Some(desc)));
        }
    }
    match string_utils::parse_int(spec) {
        Some(value) if value < 65536 => {
            let tag = value as u16;
            Ok((tag, primary.by_id(tag)))
        }
        _ => Err(TiffError::UnknownTag(spec.to_string())),
    }
}

/// True if the compression code loses information
pub fn is_lossy_compression(code: u64) -> bool {
    LOSSY_COMPRESSIONS.contains(&code)
}
