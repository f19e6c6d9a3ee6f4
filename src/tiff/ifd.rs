//! Image File Directory (IFD) structures and methods
//!
//! This module implements the in-memory TIFF model: IFDs as ordered maps of
//! tag entries, with each entry holding either its canonical payload bytes
//! or a tree of nested IFDs. The raw payload is always the source of truth;
//! decoded views are derived on demand and never written back.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use log::trace;

use crate::io::byte_order::{handler_for, ByteOrderHandler};
use crate::tiff::constants::{tags, TagSetId};
use crate::tiff::datatype::Datatype;
use crate::utils::string_utils;

/// The payload of a tag entry
#[derive(Debug, Clone)]
pub enum TagData {
    /// Canonical payload bytes, in the model's byte order
    Raw(Vec<u8>),
    /// Nested IFDs: one chain per offset word in the original payload
    SubIfds(Vec<Vec<Ifd>>),
}

/// One decoded element of a tag payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Rational(u64, u64),
    SRational(i64, i64),
}

impl DecodedValue {
    /// Coerces the value to an unsigned integer where that makes sense
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DecodedValue::Unsigned(v) => Some(*v),
            DecodedValue::Signed(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Each entry is a (tag, datatype, count, payload) record. The count is the
/// number of elements; for ASCII and UNDEFINED it is the length in bytes.
#[derive(Debug, Clone)]
pub struct TagEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field datatype
    pub datatype: Datatype,
    /// Number of elements
    pub count: u64,
    /// Payload bytes or nested IFDs
    pub data: TagData,
}

impl TagEntry {
    /// Creates an entry holding raw payload bytes
    ///
    /// The count is derived from the payload length and element size.
    pub fn new_raw(tag: u16, datatype: Datatype, bytes: Vec<u8>) -> Self {
        let count = bytes.len() as u64 / datatype.size();
        TagEntry {
            tag,
            datatype,
            count,
            data: TagData::Raw(bytes),
        }
    }

    /// Creates an entry holding nested IFD chains
    pub fn new_sub_ifds(tag: u16, datatype: Datatype, chains: Vec<Vec<Ifd>>) -> Self {
        let count = chains.len() as u64;
        TagEntry {
            tag,
            datatype,
            count,
            data: TagData::SubIfds(chains),
        }
    }

    /// Payload length in bytes implied by count and datatype
    pub fn payload_len(&self) -> u64 {
        self.count * self.datatype.size()
    }

    /// The raw payload bytes, if this entry is not a nested-IFD entry
    pub fn raw(&self) -> Option<&[u8]> {
        match &self.data {
            TagData::Raw(bytes) => Some(bytes),
            TagData::SubIfds(_) => None,
        }
    }

    /// The nested IFD chains, if any
    pub fn sub_ifds(&self) -> Option<&Vec<Vec<Ifd>>> {
        match &self.data {
            TagData::SubIfds(chains) => Some(chains),
            TagData::Raw(_) => None,
        }
    }

    /// Mutable access to the nested IFD chains
    pub fn sub_ifds_mut(&mut self) -> Option<&mut Vec<Vec<Ifd>>> {
        match &mut self.data {
            TagData::SubIfds(chains) => Some(chains),
            TagData::Raw(_) => None,
        }
    }

    /// Determines if the payload fits inline in the entry's value field
    pub fn is_value_inline(&self, big_tiff: bool) -> bool {
        let inline_size = if big_tiff { 8 } else { 4 };
        self.payload_len() <= inline_size
    }

    /// Decodes the payload into typed elements
    ///
    /// Returns None for nested-IFD entries and for ASCII/UNDEFINED data,
    /// which have no numeric elements.
    pub fn decoded_values(&self, handler: &dyn ByteOrderHandler) -> Option<Vec<DecodedValue>> {
        let bytes = self.raw()?;
        let size = self.datatype.size() as usize;
        if self.datatype.is_ascii() || self.datatype == Datatype::Undefined {
            return None;
        }
        let mut values = Vec::with_capacity(self.count as usize);
        for chunk in bytes.chunks_exact(size) {
            let value = match self.datatype {
                Datatype::Byte => DecodedValue::Unsigned(chunk[0] as u64),
                Datatype::SByte => DecodedValue::Signed(chunk[0] as i8 as i64),
                Datatype::Short => DecodedValue::Unsigned(handler.u16_from_bytes(chunk) as u64),
                Datatype::SShort => DecodedValue::Signed(handler.u16_from_bytes(chunk) as i16 as i64),
                Datatype::Long | Datatype::Ifd => {
                    DecodedValue::Unsigned(handler.u32_from_bytes(chunk) as u64)
                }
                Datatype::SLong => DecodedValue::Signed(handler.u32_from_bytes(chunk) as i32 as i64),
                Datatype::Long8 | Datatype::Ifd8 => {
                    DecodedValue::Unsigned(handler.u64_from_bytes(chunk))
                }
                Datatype::SLong8 => DecodedValue::Signed(handler.u64_from_bytes(chunk) as i64),
                Datatype::Float => {
                    DecodedValue::Float(f32::from_bits(handler.u32_from_bytes(chunk)) as f64)
                }
                Datatype::Double => DecodedValue::Float(f64::from_bits(handler.u64_from_bytes(chunk))),
                Datatype::Rational => DecodedValue::Rational(
                    handler.u32_from_bytes(&chunk[..4]) as u64,
                    handler.u32_from_bytes(&chunk[4..]) as u64,
                ),
                Datatype::SRational => DecodedValue::SRational(
                    handler.u32_from_bytes(&chunk[..4]) as i32 as i64,
                    handler.u32_from_bytes(&chunk[4..]) as i32 as i64,
                ),
                Datatype::Ascii | Datatype::Undefined => unreachable!(),
            };
            values.push(value);
        }
        Some(values)
    }

    /// Decodes the payload as a list of unsigned integers
    ///
    /// Used for offset and bytecount tags, whatever their declared integer
    /// datatype.
    pub fn decoded_u64s(&self, handler: &dyn ByteOrderHandler) -> Option<Vec<u64>> {
        self.decoded_values(handler)?
            .iter()
            .map(|v| v.as_u64())
            .collect()
    }

    /// Payload bytes converted from one byte order to another
    ///
    /// Payload bytes are canonical in the byte order they were read with;
    /// when the target order differs, every multi-byte element is swapped.
    /// Rationals swap their two words independently. One-byte datatypes and
    /// ASCII/UNDEFINED data pass through verbatim.
    pub fn payload_in_order(&self, src_big_endian: bool, dst_big_endian: bool) -> Vec<u8> {
        let raw = self.raw().unwrap_or(&[]).to_vec();
        if src_big_endian == dst_big_endian {
            return raw;
        }
        let element = if self.datatype.is_rational() {
            4
        } else {
            self.datatype.size() as usize
        };
        if element <= 1 {
            return raw;
        }
        let mut swapped = raw;
        for chunk in swapped.chunks_exact_mut(element) {
            chunk.reverse();
        }
        swapped
    }

    /// Decodes an ASCII payload, trimming trailing NULs
    ///
    /// Returns None when the payload is not valid UTF-8; display code then
    /// falls back to a lossy byte rendering.
    pub fn decoded_ascii(&self) -> Option<String> {
        let mut bytes = self.raw()?.to_vec();
        string_utils::trim_trailing_nulls(&mut bytes);
        String::from_utf8(bytes).ok()
    }
}

/// Represents an Image File Directory (IFD) in a TIFF file
///
/// An IFD stores metadata as a series of tag entries, ordered by tag ID as
/// required by the TIFF specification. IFDs appear both in the top-level
/// chain and nested under SubIFD-bearing tags of a parent IFD.
#[derive(Debug, Clone)]
pub struct Ifd {
    /// Entries keyed and ordered by tag ID
    pub entries: BTreeMap<u16, TagEntry>,
    /// Offset of this IFD in the source file (informational only)
    pub offset: u64,
    /// Byte order inherited from the file
    pub big_endian: bool,
    /// BigTIFF layout inherited from the file
    pub big_tiff: bool,
    /// Tag set used to resolve names in this IFD
    pub tag_set: TagSetId,
    /// File the payloads and image data were read from
    pub source: Option<PathBuf>,
    /// Length of the source file, for offset validation when copying
    pub source_size: u64,
}

impl Ifd {
    /// Creates an empty IFD
    pub fn new(offset: u64, big_endian: bool, big_tiff: bool) -> Self {
        Ifd {
            entries: BTreeMap::new(),
            offset,
            big_endian,
            big_tiff,
            tag_set: TagSetId::Tiff,
            source: None,
            source_size: 0,
        }
    }

    /// Adds an entry, replacing any previous entry for the same tag
    ///
    /// Returns the replaced entry when the tag was already present.
    pub fn add_entry(&mut self, entry: TagEntry) -> Option<TagEntry> {
        trace!(
            "Adding entry to IFD at {}: tag={} type={} count={}",
            self.offset,
            entry.tag,
            entry.datatype,
            entry.count
        );
        self.entries.insert(entry.tag, entry)
    }

    /// Removes an entry by tag
    pub fn remove_entry(&mut self, tag: u16) -> Option<TagEntry> {
        self.entries.remove(&tag)
    }

    /// Gets an entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&TagEntry> {
        self.entries.get(&tag)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// The byte order handler matching this IFD's endianness
    pub fn handler(&self) -> Box<dyn ByteOrderHandler> {
        handler_for(self.big_endian)
    }

    /// First decoded value of a tag, as an unsigned integer
    pub fn tag_value(&self, tag: u16) -> Option<u64> {
        let entry = self.get_entry(tag)?;
        entry.decoded_u64s(self.handler().as_ref())?.first().copied()
    }

    /// Image dimensions, if both dimension tags are present
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        let width = self.tag_value(tags::IMAGE_WIDTH)?;
        let height = self.tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Iterates over all nested IFDs, depth first
    pub fn sub_ifds(&self) -> impl Iterator<Item = &Ifd> {
        self.entries
            .values()
            .filter_map(|entry| entry.sub_ifds())
            .flatten()
            .flatten()
    }

    /// Total number of IFDs in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self
            .sub_ifds()
            .map(|ifd| ifd.subtree_len())
            .sum::<usize>()
    }
}

impl fmt::Display for Ifd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD (offset: {})", self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;
        if let Some((width, height)) = self.dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }
        for entry in self.entries.values() {
            writeln!(
                f,
                "    {} [{}] count {}",
                entry.tag,
                entry.datatype,
                entry.count
            )?;
        }
        Ok(())
    }
}
