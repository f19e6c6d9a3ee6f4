pub mod api;
pub mod commands;
pub mod io;
pub mod tiff;
pub mod utils;

pub use crate::api::Tiffkit;

pub use tiff::{
    read_tiff, write_tiff, Datatype, Ifd, TagData, TagEntry, TiffError, TiffInfo, TiffReader,
    TiffResult, TiffWriter, WriteOptions,
};
