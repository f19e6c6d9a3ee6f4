//! I/O abstractions
//!
//! Byte order strategies and seekable stream traits shared by the
//! TIFF reader and writer.

pub mod byte_order;
pub mod seekable;

pub use byte_order::{ByteOrder, ByteOrderHandler};
pub use seekable::SeekableReader;
