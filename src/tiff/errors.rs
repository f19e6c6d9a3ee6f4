//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTiffHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Unknown field datatype in a known tag
    UnknownDatatype(u16),
    /// File ends before a declared structure
    TruncatedFile,
    /// An IFD offset was visited twice
    CircularIfdReference(u64),
    /// An offset/length pair points outside the file
    InvalidOffset { offset: u64, length: u64 },
    /// SubIFD nesting exceeds the supported depth
    NestingTooDeep(usize),
    /// An offset tag has no matching bytecount tag, or counts differ
    MissingBytecounts(u16),
    /// Data requires BigTIFF but classic layout was forced
    BigTiffRequired,
    /// Unknown symbolic tag name or datatype in user input
    UnknownTag(String),
    /// A user-supplied value cannot be parsed for its datatype
    InvalidValue(String),
    /// Output path exists and overwriting was not allowed
    OutputExists(String),
    /// Malformed command-line directive or conflicting options
    UsageError(String),
    /// Generic format error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidHeader => write!(f, "Invalid TIFF header"),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTiffHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::UnknownDatatype(dt) => write!(f, "Unknown field datatype: {}", dt),
            TiffError::TruncatedFile => write!(f, "File is truncated"),
            TiffError::CircularIfdReference(offset) => {
                write!(f, "Circular IFD reference at offset {} ({:#x})", offset, offset)
            }
            TiffError::InvalidOffset { offset, length } => write!(
                f,
                "Cannot read {} bytes at offset {} ({:#x})",
                length, offset, offset
            ),
            TiffError::NestingTooDeep(depth) => {
                write!(f, "SubIFD nesting exceeds the supported depth of {}", depth)
            }
            TiffError::MissingBytecounts(tag) => {
                write!(f, "Offset tag {} has no matching bytecount tag", tag)
            }
            TiffError::BigTiffRequired => {
                write!(f, "The data is large enough that it must be written as BigTIFF")
            }
            TiffError::UnknownTag(name) => write!(f, "Unknown tag: {}", name),
            TiffError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            TiffError::OutputExists(path) => write!(f, "File already exists: {}", path),
            TiffError::UsageError(msg) => write!(f, "{}", msg),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

impl TiffError {
    /// Maps the error to the CLI exit code: 1 user error, 2 I/O error,
    /// 3 format error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TiffError::UnknownTag(_)
            | TiffError::InvalidValue(_)
            | TiffError::OutputExists(_)
            | TiffError::UsageError(_) => 1,
            TiffError::IoError(_) => 2,
            _ => 3,
        }
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
