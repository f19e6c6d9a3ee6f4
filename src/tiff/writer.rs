//! TIFF writing strategies
//!
//! This module emits a complete TIFF or BigTIFF file from the in-memory
//! model. Entries store offsets to their own payloads and to other IFDs, so
//! a single emission pass is impossible: pass 1 plans the layout and assigns
//! every region its absolute offset, pass 2 writes bytes in strictly
//! increasing file position with no back-patching.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::io::byte_order::{handler_for, ByteOrderHandler};
use crate::tiff::constants::{self, header, Bytecounts, TagSetId};
use crate::tiff::datatype::Datatype;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{Ifd, TagEntry};
use crate::tiff::types::TiffInfo;
use crate::tiff::validation::{self, check_offset};
use crate::utils::write_utils;

/// Copy buffer size for image data
const COPY_CHUNK_SIZE: usize = 1024 * 1024;

/// Classic layout is abandoned once the projected size reaches this limit
const CLASSIC_SIZE_LIMIT: u64 = (1u64 << 32) - 2048;

/// Options controlling how a model is written back to disk
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Some(true) forces BigTIFF, Some(false) forces classic, None decides
    /// from the model and the projected layout
    pub big_tiff: Option<bool>,
    /// Write all directories before any image data
    pub ifds_first: bool,
    /// Allow replacing an existing output file
    pub allow_existing: bool,
}

/// How the payload of a planned entry is produced at emission time
enum PayloadPlan {
    /// Verbatim bytes, already in output byte order
    Bytes(Vec<u8>),
    /// One word per SubIFD chain, pointing at its head directory
    SubIfdPointers(Vec<Option<usize>>),
    /// Rewritten offsets of copied image-data ranges
    DataOffsets(Vec<u64>),
}

/// A fully planned directory entry
struct EntryPlan {
    tag: u16,
    datatype: Datatype,
    count: u64,
    payload: PayloadPlan,
    payload_len: u64,
    /// Assigned offset for out-of-line payloads, None when inline
    payload_offset: Option<u64>,
}

/// A planned directory block
struct DirPlan {
    offset: u64,
    entries: Vec<EntryPlan>,
    next_dir: Option<usize>,
}

/// One step of an image-data copy region
enum CopyOp {
    /// Zero padding up to the next word boundary
    Pad(u64),
    /// A coalesced read from the source file
    Run { src_offset: u64, length: u64 },
}

/// An emitted region of the output file
enum Region {
    Header,
    Pad(u64),
    Directory(usize),
    Payload { dir: usize, entry: usize },
    ImageData { source: Option<PathBuf>, ops: Vec<CopyOp> },
}

/// Image data waiting for layout when directories are written first
struct PendingCopy {
    dir: usize,
    entry: usize,
    offsets: Vec<u64>,
    lengths: Vec<u64>,
    source: Option<PathBuf>,
    source_size: u64,
}

/// The complete layout produced by pass 1
pub(crate) struct Plan {
    big_endian: bool,
    pub(crate) big_tiff: bool,
    offset_size: u64,
    dirs: Vec<DirPlan>,
    regions: Vec<Region>,
    first_dir: Option<usize>,
    pub(crate) total_size: u64,
}

/// Pass 1 state
struct Planner {
    big_endian: bool,
    big_tiff: bool,
    ifds_first: bool,
    offset_size: u64,
    cursor: u64,
    dirs: Vec<DirPlan>,
    regions: Vec<Region>,
    deferred: Vec<PendingCopy>,
}

impl Planner {
    fn new(big_endian: bool, big_tiff: bool, ifds_first: bool) -> Self {
        let header_size = if big_tiff {
            header::BIGTIFF_HEADER_SIZE
        } else {
            header::CLASSIC_HEADER_SIZE
        };
        Planner {
            big_endian,
            big_tiff,
            ifds_first,
            offset_size: if big_tiff { 8 } else { 4 },
            cursor: header_size,
            dirs: Vec::new(),
            regions: vec![Region::Header],
            deferred: Vec::new(),
        }
    }

    fn entry_size(&self) -> u64 {
        if self.big_tiff { 20 } else { 12 }
    }

    fn dir_size(&self, entry_count: u64) -> u64 {
        if self.big_tiff {
            8 + self.entry_size() * entry_count + 8
        } else {
            2 + self.entry_size() * entry_count + 4
        }
    }

    /// Pads the cursor to a word boundary, recording the padding region
    fn align(&mut self) {
        let pad = write_utils::padding_for(self.cursor);
        if pad > 0 {
            self.regions.push(Region::Pad(pad));
            self.cursor += pad;
        }
    }

    /// Plans a chain of IFDs, linking successor pointers; returns the head
    fn plan_chain(&mut self, chain: &[Ifd], depth: usize) -> TiffResult<Option<usize>> {
        let mut head = None;
        let mut prev: Option<usize> = None;
        for ifd in chain {
            let dir_idx = self.plan_ifd(ifd, depth)?;
            if let Some(prev_idx) = prev {
                self.dirs[prev_idx].next_dir = Some(dir_idx);
            }
            if head.is_none() {
                head = Some(dir_idx);
            }
            prev = Some(dir_idx);
        }
        Ok(head)
    }

    /// Plans one IFD: directory block, out-of-line payloads, image data and
    /// SubIFD subtrees, in emission order
    fn plan_ifd(&mut self, ifd: &Ifd, depth: usize) -> TiffResult<usize> {
        validation::validate_depth(depth)?;
        if !self.big_tiff && ifd.entries.len() > u16::MAX as usize {
            return Err(TiffError::BigTiffRequired);
        }

        let set = constants::tag_set(ifd.tag_set);
        let mut entries = Vec::with_capacity(ifd.entries.len());
        let mut pending: Vec<PendingCopy> = Vec::new();
        let mut sub_entries: Vec<usize> = Vec::new();
        let dir_idx = self.dirs.len();

        for (entry_idx, entry) in ifd.entries.values().enumerate() {
            let descriptor = set.by_id(entry.tag);
            let plan = if let Some(chains) = entry.sub_ifds() {
                sub_entries.push(entry_idx);
                let datatype = if self.big_tiff { Datatype::Ifd8 } else { Datatype::Ifd };
                EntryPlan {
                    tag: entry.tag,
                    datatype,
                    count: chains.len() as u64,
                    payload: PayloadPlan::SubIfdPointers(vec![None; chains.len()]),
                    payload_len: chains.len() as u64 * self.offset_size,
                    payload_offset: None,
                }
            } else if descriptor.map_or(false, |d| d.is_offset_data()) {
                let (offsets, lengths) = self.resolve_pair(ifd, entry, set.id)?;
                let datatype = if self.big_tiff { Datatype::Long8 } else { Datatype::Long };
                let count = offsets.len() as u64;
                pending.push(PendingCopy {
                    dir: dir_idx,
                    entry: entry_idx,
                    offsets,
                    lengths,
                    source: ifd.source.clone(),
                    source_size: ifd.source_size,
                });
                EntryPlan {
                    tag: entry.tag,
                    datatype,
                    count,
                    payload: PayloadPlan::DataOffsets(vec![0; count as usize]),
                    payload_len: count * self.offset_size,
                    payload_offset: None,
                }
            } else {
                let bytes = entry.payload_in_order(ifd.big_endian, self.big_endian);
                EntryPlan {
                    tag: entry.tag,
                    datatype: entry.datatype,
                    count: entry.count,
                    payload_len: bytes.len() as u64,
                    payload: PayloadPlan::Bytes(bytes),
                    payload_offset: None,
                }
            };
            if !self.big_tiff && plan.count > u32::MAX as u64 {
                return Err(TiffError::BigTiffRequired);
            }
            entries.push(plan);
        }

        // Directory block
        self.align();
        let dir_offset = self.cursor;
        self.cursor += self.dir_size(entries.len() as u64);
        self.dirs.push(DirPlan {
            offset: dir_offset,
            entries,
            next_dir: None,
        });
        self.regions.push(Region::Directory(dir_idx));

        // Out-of-line tag payloads
        for entry_idx in 0..self.dirs[dir_idx].entries.len() {
            let len = self.dirs[dir_idx].entries[entry_idx].payload_len;
            if len > self.offset_size {
                self.align();
                self.dirs[dir_idx].entries[entry_idx].payload_offset = Some(self.cursor);
                self.cursor += len;
                self.regions.push(Region::Payload {
                    dir: dir_idx,
                    entry: entry_idx,
                });
            }
        }

        // Image data referenced by offset/bytecount pairs
        for copy in pending {
            if self.ifds_first {
                self.deferred.push(copy);
            } else {
                self.plan_copy(copy)?;
            }
        }

        // SubIFD subtrees
        for entry_idx in sub_entries {
            let tag = self.dirs[dir_idx].entries[entry_idx].tag;
            let chains = ifd
                .get_entry(tag)
                .and_then(|e| e.sub_ifds())
                .expect("planned SubIFD entry lost its chains");
            let mut heads = Vec::with_capacity(chains.len());
            for chain in chains {
                heads.push(self.plan_chain(chain, depth + 1)?);
            }
            self.dirs[dir_idx].entries[entry_idx].payload = PayloadPlan::SubIfdPointers(heads);
        }

        Ok(dir_idx)
    }

    /// Decodes an offset tag and its paired bytecounts
    fn resolve_pair(
        &self,
        ifd: &Ifd,
        entry: &TagEntry,
        set_id: TagSetId,
    ) -> TiffResult<(Vec<u64>, Vec<u64>)> {
        let set = constants::tag_set(set_id);
        let descriptor = set
            .by_id(entry.tag)
            .ok_or_else(|| TiffError::GenericError("offset tag lost its descriptor".into()))?;
        let handler = ifd.handler();
        let offsets = entry
            .decoded_u64s(handler.as_ref())
            .ok_or_else(|| TiffError::MissingBytecounts(entry.tag))?;
        let lengths = match descriptor.bytecounts {
            Some(Bytecounts::Fixed(length)) => vec![length; offsets.len()],
            Some(Bytecounts::Tag(name)) => {
                let pair = set
                    .by_name(name)
                    .and_then(|desc| ifd.get_entry(desc.id))
                    .ok_or(TiffError::MissingBytecounts(entry.tag))?;
                let lengths = pair
                    .decoded_u64s(handler.as_ref())
                    .ok_or(TiffError::MissingBytecounts(entry.tag))?;
                if lengths.len() != offsets.len() {
                    return Err(TiffError::MissingBytecounts(entry.tag));
                }
                lengths
            }
            None => return Err(TiffError::MissingBytecounts(entry.tag)),
        };
        Ok((offsets, lengths))
    }

    /// Assigns output offsets for copied data ranges
    ///
    /// Ranges keep their source-file order. An immediately repeated
    /// (offset, length) pair reuses the previous output range instead of
    /// being copied again. Adjacent source ranges are coalesced into single
    /// copy runs so the emitter can read them with one call.
    fn plan_copy(&mut self, copy: PendingCopy) -> TiffResult<()> {
        let count = copy.offsets.len();
        let mut dest = vec![0u64; count];
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&idx| (copy.offsets[idx], idx));

        let mut ops: Vec<CopyOp> = Vec::new();
        let mut last: Option<(u64, u64, usize)> = None;
        for idx in order {
            let offset = copy.offsets[idx];
            let length = copy.lengths[idx];
            if offset == 0 || !check_offset(copy.source_size, offset, length) {
                warn!(
                    "Skipping unreadable data range at {} (+{}) for tag copy",
                    offset, length
                );
                continue;
            }
            if let Some((last_offset, last_length, last_idx)) = last {
                if last_offset == offset && last_length == length {
                    dest[idx] = dest[last_idx];
                    continue;
                }
            }
            last = Some((offset, length, idx));

            let pad = write_utils::padding_for(self.cursor);
            if pad > 0 {
                ops.push(CopyOp::Pad(pad));
                self.cursor += pad;
            }
            dest[idx] = self.cursor;
            match ops.last_mut() {
                Some(CopyOp::Run { src_offset, length: run_len })
                    if *src_offset + *run_len == offset =>
                {
                    *run_len += length;
                }
                _ => ops.push(CopyOp::Run {
                    src_offset: offset,
                    length,
                }),
            }
            self.cursor += length;
        }

        if !ops.is_empty() {
            self.regions.push(Region::ImageData {
                source: copy.source.clone(),
                ops,
            });
        }
        self.dirs[copy.dir].entries[copy.entry].payload = PayloadPlan::DataOffsets(dest);
        Ok(())
    }

    fn finish(mut self, ifds: &[Ifd]) -> TiffResult<Plan> {
        let first_dir = if ifds.is_empty() { None } else { Some(0) };
        let deferred = std::mem::take(&mut self.deferred);
        for copy in deferred {
            self.plan_copy(copy)?;
        }
        if !self.big_tiff && self.cursor > CLASSIC_SIZE_LIMIT {
            return Err(TiffError::BigTiffRequired);
        }
        Ok(Plan {
            big_endian: self.big_endian,
            big_tiff: self.big_tiff,
            offset_size: self.offset_size,
            dirs: self.dirs,
            regions: self.regions,
            first_dir,
            total_size: self.cursor,
        })
    }
}

/// True if any entry anywhere in the tree uses a BigTIFF-only datatype
fn requires_big_tiff(ifds: &[Ifd]) -> bool {
    ifds.iter().any(|ifd| {
        ifd.entries
            .values()
            .any(|entry| entry.datatype.is_bigtiff_only())
            || ifd
                .entries
                .values()
                .filter_map(|entry| entry.sub_ifds())
                .any(|chains| chains.iter().any(|chain| requires_big_tiff(chain)))
    })
}

/// Handles writing TIFF files to disk
pub struct TiffWriter;

impl TiffWriter {
    /// Writes a model to a path, going through a temporary sibling file
    ///
    /// The temporary file is renamed over the destination on success and
    /// removed on failure, so no partial output is ever left behind.
    pub fn write<P: AsRef<Path>>(
        info: &TiffInfo,
        path: P,
        options: &WriteOptions,
    ) -> TiffResult<()> {
        Self::write_ifds(&info.ifds, info.big_endian, info.big_tiff, path, options)
    }

    /// Writes a list of top-level IFDs as a complete TIFF file
    pub fn write_ifds<P: AsRef<Path>>(
        ifds: &[Ifd],
        big_endian: bool,
        big_tiff: bool,
        path: P,
        options: &WriteOptions,
    ) -> TiffResult<()> {
        let path = path.as_ref();
        if path.exists() && !options.allow_existing {
            return Err(TiffError::OutputExists(path.display().to_string()));
        }
        info!("Writing TIFF to {}", path.display());

        let plan = Self::plan(ifds, big_endian, big_tiff, options)?;
        debug!(
            "Planned {} ({} bytes, {} directories)",
            if plan.big_tiff { "BigTIFF" } else { "classic TIFF" },
            plan.total_size,
            plan.dirs.len()
        );

        let temp_path = temp_sibling(path);
        let result = (|| -> TiffResult<()> {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::with_capacity(1024 * 1024, file);
            Self::emit(&plan, &mut writer)?;
            writer.flush()?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                fs::rename(&temp_path, path)?;
                Ok(())
            }
            Err(err) => {
                let _ = fs::remove_file(&temp_path);
                Err(err)
            }
        }
    }

    /// Pass 1: chooses the layout flavor and plans every region
    pub(crate) fn plan(
        ifds: &[Ifd],
        big_endian: bool,
        model_big_tiff: bool,
        options: &WriteOptions,
    ) -> TiffResult<Plan> {
        let mut big_tiff = options.big_tiff.unwrap_or(model_big_tiff);
        if !big_tiff && requires_big_tiff(ifds) {
            if options.big_tiff == Some(false) {
                return Err(TiffError::BigTiffRequired);
            }
            big_tiff = true;
        }

        let attempt = |as_big: bool| -> TiffResult<Plan> {
            let mut planner = Planner::new(big_endian, as_big, options.ifds_first);
            planner.plan_chain(ifds, 0)?;
            planner.finish(ifds)
        };

        match attempt(big_tiff) {
            Err(TiffError::BigTiffRequired) if !big_tiff => {
                if options.big_tiff == Some(false) {
                    return Err(TiffError::BigTiffRequired);
                }
                debug!("Classic layout overflowed, replanning as BigTIFF");
                attempt(true)
            }
            other => other,
        }
    }

    /// Pass 2: emits every planned region in strictly increasing position
    fn emit<W: Write>(plan: &Plan, writer: &mut W) -> TiffResult<()> {
        let handler = handler_for(plan.big_endian);
        let mut sources: HashMap<PathBuf, BufReader<File>> = HashMap::new();
        let mut position: u64 = 0;

        for region in &plan.regions {
            match region {
                Region::Header => {
                    position += Self::emit_header(plan, handler.as_ref(), writer)?;
                }
                Region::Pad(pad) => {
                    writer.write_all(&vec![0u8; *pad as usize])?;
                    position += pad;
                }
                Region::Directory(dir_idx) => {
                    position +=
                        Self::emit_directory(plan, handler.as_ref(), &plan.dirs[*dir_idx], writer)?;
                }
                Region::Payload { dir, entry } => {
                    let entry = &plan.dirs[*dir].entries[*entry];
                    debug_assert_eq!(entry.payload_offset, Some(position));
                    let bytes = Self::payload_bytes(plan, handler.as_ref(), entry);
                    writer.write_all(&bytes)?;
                    position += bytes.len() as u64;
                }
                Region::ImageData { source, ops } => {
                    position += Self::emit_image_data(source.as_deref(), ops, &mut sources, writer)?;
                }
            }
        }
        debug_assert_eq!(position, plan.total_size);
        Ok(())
    }

    fn emit_header<W: Write>(
        plan: &Plan,
        handler: &dyn ByteOrderHandler,
        writer: &mut W,
    ) -> TiffResult<u64> {
        let first_ifd = plan
            .first_dir
            .map(|idx| plan.dirs[idx].offset)
            .unwrap_or(0);
        let byte_order = if plan.big_endian {
            crate::io::byte_order::ByteOrder::BigEndian
        } else {
            crate::io::byte_order::ByteOrder::LittleEndian
        };
        writer.write_all(&byte_order.marker())?;
        if plan.big_tiff {
            writer.write_all(&handler.u16_to_bytes(header::BIG_TIFF_VERSION))?;
            writer.write_all(&handler.u16_to_bytes(header::BIGTIFF_OFFSET_SIZE))?;
            writer.write_all(&handler.u16_to_bytes(0))?;
            writer.write_all(&handler.u64_to_bytes(first_ifd))?;
            Ok(header::BIGTIFF_HEADER_SIZE)
        } else {
            writer.write_all(&handler.u16_to_bytes(header::TIFF_VERSION))?;
            writer.write_all(&handler.u32_to_bytes(first_ifd as u32))?;
            Ok(header::CLASSIC_HEADER_SIZE)
        }
    }

    fn emit_directory<W: Write>(
        plan: &Plan,
        handler: &dyn ByteOrderHandler,
        dir: &DirPlan,
        writer: &mut W,
    ) -> TiffResult<u64> {
        let mut written: u64 = 0;
        if plan.big_tiff {
            writer.write_all(&handler.u64_to_bytes(dir.entries.len() as u64))?;
            written += 8;
        } else {
            writer.write_all(&handler.u16_to_bytes(dir.entries.len() as u16))?;
            written += 2;
        }

        for entry in &dir.entries {
            writer.write_all(&handler.u16_to_bytes(entry.tag))?;
            writer.write_all(&handler.u16_to_bytes(entry.datatype.code()))?;
            if plan.big_tiff {
                writer.write_all(&handler.u64_to_bytes(entry.count))?;
            } else {
                writer.write_all(&handler.u32_to_bytes(entry.count as u32))?;
            }
            match entry.payload_offset {
                Some(offset) => {
                    if plan.big_tiff {
                        writer.write_all(&handler.u64_to_bytes(offset))?;
                    } else {
                        writer.write_all(&handler.u32_to_bytes(offset as u32))?;
                    }
                }
                None => {
                    // Inline: payload bytes occupy the low-order end of the
                    // value field, zero padded.
                    let mut field = Self::payload_bytes(plan, handler, entry);
                    field.resize(plan.offset_size as usize, 0);
                    writer.write_all(&field)?;
                }
            }
            written += if plan.big_tiff { 20 } else { 12 };
        }

        let next_offset = dir.next_dir.map(|idx| plan.dirs[idx].offset).unwrap_or(0);
        if plan.big_tiff {
            writer.write_all(&handler.u64_to_bytes(next_offset))?;
            written += 8;
        } else {
            writer.write_all(&handler.u32_to_bytes(next_offset as u32))?;
            written += 4;
        }
        Ok(written)
    }

    /// Renders a planned payload to bytes in the output byte order
    fn payload_bytes(plan: &Plan, handler: &dyn ByteOrderHandler, entry: &EntryPlan) -> Vec<u8> {
        match &entry.payload {
            PayloadPlan::Bytes(bytes) => bytes.clone(),
            PayloadPlan::SubIfdPointers(heads) => {
                let mut out = Vec::with_capacity(heads.len() * plan.offset_size as usize);
                for head in heads {
                    let offset = head.map(|idx| plan.dirs[idx].offset).unwrap_or(0);
                    if plan.big_tiff {
                        out.extend_from_slice(&handler.u64_to_bytes(offset));
                    } else {
                        out.extend_from_slice(&handler.u32_to_bytes(offset as u32));
                    }
                }
                out
            }
            PayloadPlan::DataOffsets(offsets) => {
                let mut out = Vec::with_capacity(offsets.len() * plan.offset_size as usize);
                for &offset in offsets {
                    if plan.big_tiff {
                        out.extend_from_slice(&handler.u64_to_bytes(offset));
                    } else {
                        out.extend_from_slice(&handler.u32_to_bytes(offset as u32));
                    }
                }
                out
            }
        }
    }

    /// Streams copied image data out of the source file in bounded chunks
    fn emit_image_data<W: Write>(
        source: Option<&Path>,
        ops: &[CopyOp],
        sources: &mut HashMap<PathBuf, BufReader<File>>,
        writer: &mut W,
    ) -> TiffResult<u64> {
        let mut written: u64 = 0;
        for op in ops {
            match op {
                CopyOp::Pad(pad) => {
                    writer.write_all(&vec![0u8; *pad as usize])?;
                    written += pad;
                }
                CopyOp::Run { src_offset, length } => {
                    let path = source.ok_or_else(|| {
                        TiffError::GenericError(
                            "Cannot copy image data: the model has no source file".to_string(),
                        )
                    })?;
                    let reader = match sources.entry(path.to_path_buf()) {
                        std::collections::hash_map::Entry::Occupied(slot) => slot.into_mut(),
                        std::collections::hash_map::Entry::Vacant(slot) => {
                            slot.insert(BufReader::with_capacity(COPY_CHUNK_SIZE, File::open(path)?))
                        }
                    };
                    reader.seek(SeekFrom::Start(*src_offset))?;
                    let mut remaining = *length;
                    let mut buffer = vec![0u8; COPY_CHUNK_SIZE];
                    while remaining > 0 {
                        let take = remaining.min(COPY_CHUNK_SIZE as u64) as usize;
                        reader.read_exact(&mut buffer[..take])?;
                        writer.write_all(&buffer[..take])?;
                        remaining -= take as u64;
                    }
                    written += length;
                }
            }
        }
        Ok(written)
    }
}

/// A temporary path in the same directory as the destination
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes a model to a path with the given options
///
/// Convenience wrapper used by the library facade and the commands.
pub fn write_tiff<P: AsRef<Path>>(info: &TiffInfo, path: P, options: &WriteOptions) -> TiffResult<()> {
    TiffWriter::write(info, path, options)
}
