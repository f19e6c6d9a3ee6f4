//! Core TIFF data structures

use std::fmt;
use std::path::PathBuf;

use log::warn;

use crate::io::byte_order::{handler_for, ByteOrderHandler};
use crate::tiff::constants::header;
use crate::tiff::ifd::Ifd;

/// Represents a TIFF file with its Image File Directories (IFDs)
///
/// This is the root of the in-memory model: created by the reader, edited
/// by the command operations, consumed read-only by the writer.
#[derive(Debug)]
pub struct TiffInfo {
    /// Top-level Image File Directories, in chain order
    pub ifds: Vec<Ifd>,
    /// Whether the file is big-endian (MM)
    pub big_endian: bool,
    /// Whether this is a BigTIFF format
    pub big_tiff: bool,
    /// Header version word: 42 classic, 43 BigTIFF
    pub version: u16,
    /// Header-declared offset size in bytes (4 or 8)
    pub offset_size: u8,
    /// Offset of the first IFD, as declared in the header
    pub first_ifd_offset: u64,
    /// Total length of the source file in bytes
    pub size: u64,
    /// Source path, when read from a file
    pub path: Option<PathBuf>,
    /// The NDPI offset fix-up was applied while reading
    pub ndpi: bool,
    /// Non-fatal problems observed while reading
    pub warnings: Vec<String>,
}

impl TiffInfo {
    /// Creates a new empty TIFF structure
    pub fn new(big_endian: bool, big_tiff: bool) -> Self {
        TiffInfo {
            ifds: Vec::new(),
            big_endian,
            big_tiff,
            version: if big_tiff {
                header::BIG_TIFF_VERSION
            } else {
                header::TIFF_VERSION
            },
            offset_size: if big_tiff { 8 } else { 4 },
            first_ifd_offset: 0,
            size: 0,
            path: None,
            ndpi: false,
            warnings: Vec::new(),
        }
    }

    /// Returns the main (first) IFD if available
    pub fn main_ifd(&self) -> Option<&Ifd> {
        self.ifds.first()
    }

    /// Returns the number of top-level IFDs
    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }

    /// The byte order handler matching this file's endianness
    pub fn handler(&self) -> Box<dyn ByteOrderHandler> {
        handler_for(self.big_endian)
    }

    /// Records a non-fatal problem
    pub fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// Total number of IFDs including all SubIFD subtrees
    pub fn total_ifd_count(&self) -> usize {
        self.ifds.iter().map(|ifd| ifd.subtree_len()).sum()
    }
}

impl fmt::Display for TiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIFF File:")?;
        writeln!(
            f,
            "  Format: {}",
            if self.big_tiff { "BigTIFF" } else { "TIFF" }
        )?;
        writeln!(
            f,
            "  Byte order: {}",
            if self.big_endian { "big-endian" } else { "little-endian" }
        )?;
        writeln!(f, "  Number of IFDs: {}", self.ifds.len())?;
        if let Some(ifd) = self.main_ifd() {
            write!(f, "{}", ifd)?;
        }
        Ok(())
    }
}
