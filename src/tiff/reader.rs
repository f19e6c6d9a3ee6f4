//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF reader. It parses the header,
//! walks the top-level IFD chain and every SubIFD subtree, and materializes
//! tag entries together with their payload bytes, whether stored inline in
//! the entry or out-of-line at a referenced offset.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{self, TagSetId};
use crate::tiff::datatype::Datatype;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{Ifd, TagData, TagEntry};
use crate::tiff::types::TiffInfo;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::logger::Logger;

/// A directory entry before payload resolution
struct RawEntry {
    tag: u16,
    datatype_code: u16,
    count: u64,
    /// The value-or-offset field, exactly as stored
    field: [u8; 8],
    /// 4 for classic entries, 8 for BigTIFF entries
    field_len: usize,
}

/// Reader for TIFF and BigTIFF files
pub struct TiffReader<'a> {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Logger instance
    logger: &'a Logger,
    /// Current file path
    current_file: Option<PathBuf>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl<'a> TiffReader<'a> {
    /// Creates a new TIFF reader
    pub fn new(logger: &'a Logger) -> Self {
        TiffReader {
            byte_order_handler: None,
            logger,
            current_file: None,
            is_big_tiff: false,
        }
    }

    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler
            .as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads a TIFF file from the given path
    ///
    /// This is the main entry point for loading a TIFF file. It opens the
    /// file and delegates to the read() method. The path is remembered so
    /// the writer can later copy image data out of this file.
    pub fn load<P: AsRef<Path>>(&mut self, filepath: P) -> TiffResult<TiffInfo> {
        let path = filepath.as_ref();
        info!("Loading TIFF file: {}", path.display());
        let _ = self.logger.log(&format!("Loading TIFF file: {}", path.display()));
        self.current_file = Some(path.to_path_buf());

        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        self.read(&mut reader)
    }

    /// Reads a TIFF structure from the given reader
    ///
    /// 1. Detect byte order (II/MM)
    /// 2. Detect TIFF vs BigTIFF and validate the header
    /// 3. Walk the IFD chain, materializing tags and SubIFDs
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TiffInfo> {
        debug!("TiffReader::read starting");

        let (byte_order, handler) = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, version) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.byte_order_handler = Some(handler);
        self.is_big_tiff = is_big_tiff;

        let mut info = TiffInfo::new(byte_order == crate::io::byte_order::ByteOrder::BigEndian, is_big_tiff);
        info.version = version;
        info.path = self.current_file.clone();
        info.size = validation::get_file_size(reader)?;

        let first_ifd_offset = if is_big_tiff {
            self.handler()?.read_u64(reader)?
        } else {
            self.handler()?.read_u32(reader)? as u64
        };
        debug!("First IFD offset: {}", first_ifd_offset);
        validation::validate_ifd_offset(first_ifd_offset, info.size)?;
        info.first_ifd_offset = first_ifd_offset;

        let mut visited = HashSet::new();
        let ifds = self.read_ifd_chain(
            reader,
            &mut info,
            first_ifd_offset,
            TagSetId::Tiff,
            0,
            &mut visited,
        )?;
        info.ifds = ifds;

        info!(
            "Read {} top-level IFDs ({} including SubIFDs) from TIFF file",
            info.ifds.len(),
            info.total_ifd_count()
        );
        Ok(info)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// The visited set is shared across the entire file so any revisited
    /// offset, through the chain or through SubIFD pointers, is reported as
    /// a circular reference.
    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        info: &mut TiffInfo,
        first_offset: u64,
        tag_set: TagSetId,
        depth: usize,
        visited: &mut HashSet<u64>,
    ) -> TiffResult<Vec<Ifd>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_offset;

        while ifd_offset != 0 {
            if !visited.insert(ifd_offset) {
                return Err(TiffError::CircularIfdReference(ifd_offset));
            }
            debug!("Reading IFD at offset {}", ifd_offset);
            let (ifd, next_offset) =
                self.read_ifd(reader, info, ifd_offset, tag_set, depth, visited)?;
            ifds.push(ifd);

            if next_offset != 0 {
                validation::validate_ifd_offset(next_offset, info.size)?;
            }
            ifd_offset = next_offset;
        }

        Ok(ifds)
    }

    /// Reads one IFD and resolves its payloads and SubIFDs
    ///
    /// Returns the parsed IFD and the successor offset (0 at end of chain).
    fn read_ifd(
        &self,
        reader: &mut dyn SeekableReader,
        info: &mut TiffInfo,
        offset: u64,
        tag_set: TagSetId,
        depth: usize,
        visited: &mut HashSet<u64>,
    ) -> TiffResult<(Ifd, u64)> {
        validation::validate_depth(depth)?;
        let dir_header = if self.is_big_tiff { 16 } else { 6 };
        if !validation::check_offset(info.size, offset, dir_header) {
            return Err(TiffError::TruncatedFile);
        }
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_entry_count(reader)?;
        debug!("IFD entry count: {}", entry_count);

        let mut raw_entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            raw_entries.push(self.read_raw_entry(reader)?);
        }

        let next_offset = if self.is_big_tiff {
            self.handler()?.read_u64(reader)?
        } else {
            self.handler()?.read_u32(reader)? as u64
        };

        let mut ifd = Ifd::new(offset, info.big_endian, info.big_tiff);
        ifd.tag_set = tag_set;
        ifd.source = self.current_file.clone();
        ifd.source_size = info.size;

        let set = constants::tag_set(tag_set);
        for raw in raw_entries {
            let descriptor = set.by_id(raw.tag);
            let datatype = match Datatype::try_from(raw.datatype_code) {
                Ok(dt) => dt,
                Err(err) => {
                    if descriptor.is_some() {
                        return Err(err);
                    }
                    info.warn(format!(
                        "Unknown datatype {} (0x{:X}) in tag {} (0x{:X})",
                        raw.datatype_code, raw.datatype_code, raw.tag, raw.tag
                    ));
                    continue;
                }
            };
            let payload = self.read_payload(reader, info, &raw, datatype, offset, descriptor)?;
            let mut entry = TagEntry {
                tag: raw.tag,
                datatype,
                count: raw.count,
                data: TagData::Raw(payload),
            };
            self.apply_ndpi_value_fix(info, &mut entry, descriptor)?;
            if datatype.is_ascii() && entry.count > 0 && entry.decoded_ascii().is_none() {
                // kept as raw bytes; display falls back to a byte rendering
                info.warn(format!("Tag {} has a non-UTF-8 ASCII value", raw.tag));
            }

            let references_ifds =
                descriptor.map_or(false, |d| d.references_ifds()) || datatype.is_ifd();
            if references_ifds {
                let child_set = descriptor.and_then(|d| d.tag_set).unwrap_or(tag_set);
                let chains = self.read_sub_ifds(
                    reader, info, &entry, child_set, depth + 1, visited,
                )?;
                entry.data = TagData::SubIfds(chains);
            }

            if ifd.add_entry(entry).is_some() {
                info.warn(format!("Duplicate tag {} in IFD at offset {}", raw.tag, offset));
            }
        }

        Ok((ifd, next_offset))
    }

    /// Reads the entry count from an IFD
    fn read_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        if self.is_big_tiff {
            Ok(self.handler()?.read_u64(reader)?)
        } else {
            Ok(self.handler()?.read_u16(reader)? as u64)
        }
    }

    /// Reads a single raw IFD entry without resolving its payload
    fn read_raw_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<RawEntry> {
        let handler = self.handler()?;
        let tag = handler.read_u16(reader)?;
        let datatype_code = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };
        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut field = [0u8; 8];
        reader.read_exact(&mut field[..field_len])?;
        Ok(RawEntry {
            tag,
            datatype_code,
            count,
            field,
            field_len,
        })
    }

    /// Resolves an entry's payload bytes, inline or from its offset
    ///
    /// The stream position is restored before returning, so directory
    /// parsing can continue after out-of-line fetches.
    fn read_payload(
        &self,
        reader: &mut dyn SeekableReader,
        info: &mut TiffInfo,
        raw: &RawEntry,
        datatype: Datatype,
        ifd_offset: u64,
        descriptor: Option<&constants::TagDescriptor>,
    ) -> TiffResult<Vec<u8>> {
        let length = raw
            .count
            .checked_mul(datatype.size())
            .ok_or(TiffError::TruncatedFile)?;
        if length <= raw.field_len as u64 {
            return Ok(raw.field[..length as usize].to_vec());
        }

        let handler = self.handler()?;
        let mut data_offset = if raw.field_len == 8 {
            handler.u64_from_bytes(&raw.field)
        } else {
            handler.u32_from_bytes(&raw.field[..4]) as u64
        };

        // Hamamatsu NDPI files overflow classic 32-bit offsets once the file
        // grows past 4 GiB; rebase flagged tags by the missing 2^32 multiple.
        let ndpi_candidate = !self.is_big_tiff && info.size >= 0x1_0000_0000;
        if ndpi_candidate
            && descriptor.map_or(false, |d| d.ndpi_offset)
            && data_offset < ifd_offset
        {
            data_offset = ndpi_rebase_offset(ifd_offset, data_offset);
            info.ndpi = true;
            debug!(
                "NDPI offset fix-up applied to tag {}: new offset {}",
                raw.tag, data_offset
            );
        }

        if !validation::check_offset(info.size, data_offset, length) {
            return Err(TiffError::InvalidOffset {
                offset: data_offset,
                length,
            });
        }

        let return_pos = reader.stream_position()?;
        reader.seek(SeekFrom::Start(data_offset))?;
        let mut payload = vec![0u8; length as usize];
        reader.read_exact(&mut payload)?;
        reader.seek(SeekFrom::Start(return_pos))?;
        Ok(payload)
    }

    /// Rebases wrapped NDPI offset sequences by the missing 2^32 multiples
    ///
    /// Hamamatsu NDPI files keep a classic header past 4 GiB and store strip
    /// offsets as unsigned moduli. When a flagged offset tag's values are not
    /// monotonically increasing, each wrap adds another 2^32. The entry is
    /// re-encoded as LONG8, which also makes any later rewrite pick BigTIFF.
    fn apply_ndpi_value_fix(
        &self,
        info: &mut TiffInfo,
        entry: &mut TagEntry,
        descriptor: Option<&constants::TagDescriptor>,
    ) -> TiffResult<()> {
        let flagged = descriptor.map_or(false, |d| d.ndpi_offset && d.is_offset_data());
        if self.is_big_tiff || info.size < 0x1_0000_0000 || !flagged {
            return Ok(());
        }
        let handler = self.handler()?;
        let values = match entry.decoded_u64s(handler) {
            Some(values) => values,
            None => return Ok(()),
        };
        let fixed = match rebase_wrapped_offsets(&values) {
            Some(fixed) => fixed,
            None => return Ok(()),
        };
        let mut bytes = Vec::with_capacity(fixed.len() * 8);
        for value in fixed {
            bytes.extend_from_slice(&handler.u64_to_bytes(value));
        }
        debug!("NDPI value fix-up applied to tag {}", entry.tag);
        info.ndpi = true;
        *entry = TagEntry::new_raw(entry.tag, Datatype::Long8, bytes);
        Ok(())
    }

    /// Parses the SubIFD chains referenced by a nested-IFD entry
    ///
    /// The payload holds one offset word per chain. A chain that runs into
    /// the next declared chain head is cut short with a warning instead of
    /// being parsed twice ("double referenced" SubIFDs).
    fn read_sub_ifds(
        &self,
        reader: &mut dyn SeekableReader,
        info: &mut TiffInfo,
        entry: &TagEntry,
        tag_set: TagSetId,
        depth: usize,
        visited: &mut HashSet<u64>,
    ) -> TiffResult<Vec<Vec<Ifd>>> {
        validation::validate_depth(depth)?;
        let offsets = entry
            .decoded_u64s(self.handler()?)
            .ok_or_else(|| TiffError::GenericError("SubIFD payload is not numeric".to_string()))?;

        let mut chains = Vec::with_capacity(offsets.len());
        for (index, &sub_offset) in offsets.iter().enumerate() {
            let mut chain = Vec::new();
            let mut next = sub_offset;
            while next != 0 {
                if !visited.insert(next) {
                    return Err(TiffError::CircularIfdReference(next));
                }
                let (ifd, successor) =
                    self.read_ifd(reader, info, next, tag_set, depth, visited)?;
                chain.push(ifd);
                next = successor;
                if index + 1 < offsets.len() && next == offsets[index + 1] {
                    info.warn("SubIFDs are double referenced".to_string());
                    break;
                }
            }
            chains.push(chain);
        }
        Ok(chains)
    }

    /// Gets the file path if available
    pub fn get_file_path(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}

/// Rebases a wrapped 32-bit payload offset against the IFD that holds it
///
/// NDPI keeps payloads near their IFD; a stored offset far below the IFD's
/// own offset lost one or more 2^32 multiples.
pub(crate) fn ndpi_rebase_offset(ifd_offset: u64, raw: u64) -> u64 {
    ifd_offset - ((ifd_offset - raw) & 0xFFFF_FFFF)
}

/// Rebases a wrapped offset sequence by 2^32 multiples
///
/// Returns None when the sequence is already monotonically increasing and
/// needs no fix. Each wrap adds another 2^32 to all following values.
pub(crate) fn rebase_wrapped_offsets(values: &[u64]) -> Option<Vec<u64>> {
    if !values.windows(2).any(|pair| pair[1] < pair[0]) {
        return None;
    }
    let mut high: u64 = 0;
    let mut prev: u64 = 0;
    let mut fixed = Vec::with_capacity(values.len());
    for value in values {
        let mut rebased = (high << 32) | (value & 0xFFFF_FFFF);
        if rebased < prev {
            high += 1;
            rebased += 1u64 << 32;
        }
        prev = rebased;
        fixed.push(rebased);
    }
    Some(fixed)
}

/// Reads a TIFF file into the in-memory model
///
/// Convenience wrapper used by the library facade and the commands.
pub fn read_tiff<P: AsRef<Path>>(path: P, logger: &Logger) -> TiffResult<TiffInfo> {
    let mut reader = TiffReader::new(logger);
    reader.load(path)
}
