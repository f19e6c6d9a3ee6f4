//! TIFF validation utilities
//!
//! This module provides validation functions for TIFF files
//! to ensure data integrity and prevent errors when processing
//! potentially malformed files.

use log::{debug, error, warn};
use std::io::SeekFrom;

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Maximum supported SubIFD nesting depth
pub const MAX_IFD_DEPTH: usize = 16;

/// Checks whether a byte range can be read from a file
///
/// The minimum offset is the length of the classic TIFF header; nothing
/// a TIFF references may live inside the header.
///
/// # Arguments
/// * `file_size` - The length of the file
/// * `offset` - An absolute offset in the file
/// * `length` - The number of bytes to read
pub fn check_offset(file_size: u64, offset: u64, length: u64) -> bool {
    let allowed = offset >= header::CLASSIC_HEADER_SIZE
        && offset.checked_add(length).map_or(false, |end| end <= file_size);
    if !allowed {
        warn!(
            "Cannot read {} (0x{:x}) bytes from desired offset {} (0x{:x})",
            length, length, offset, offset
        );
    }
    allowed
}

/// Validates an IFD offset against the file size
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TiffResult<()> {
    if offset >= file_size || offset < header::CLASSIC_HEADER_SIZE {
        return Err(TiffError::InvalidOffset {
            offset,
            length: 0,
        });
    }
    Ok(())
}

/// Validates a SubIFD nesting depth
pub fn validate_depth(depth: usize) -> TiffResult<()> {
    if depth > MAX_IFD_DEPTH {
        return Err(TiffError::NestingTooDeep(MAX_IFD_DEPTH));
    }
    Ok(())
}

/// Gets the file size, restoring the stream position afterwards
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(current_position))?;
    Ok(file_size)
}

/// Validates the BigTIFF header
///
/// BigTIFF has specific header requirements beyond the standard TIFF.
/// After the version word come the offset size (must be 8) and a
/// reserved zero word.
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!(
            "Invalid BigTIFF header: offset_size={}, zeros={}",
            offset_size, zeros
        );
        return Err(TiffError::InvalidBigTiffHeader);
    }

    Ok(())
}
