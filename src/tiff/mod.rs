//! TIFF file format module
//!
//! This module provides structures and functions for reading, editing and
//! rewriting TIFF and BigTIFF files while preserving every tag, known or
//! unknown, across all IFDs and SubIFDs.

pub mod constants;
pub mod datatype;
pub mod dump;
pub mod errors;
pub mod geo_keys;
pub mod ifd;
pub mod reader;
pub(crate) mod types;
pub(crate) mod validation;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
pub use datatype::Datatype;
pub use errors::{TiffError, TiffResult};
pub use ifd::{DecodedValue, Ifd, TagData, TagEntry};
pub use reader::{read_tiff, TiffReader};
pub use types::TiffInfo;
pub use writer::{write_tiff, TiffWriter, WriteOptions};
