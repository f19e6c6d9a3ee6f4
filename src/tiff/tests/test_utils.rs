//! Shared helpers for TIFF module tests

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A scratch directory removed on drop
pub struct TempDir {
    root: PathBuf,
}

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl TempDir {
    pub fn new(label: &str) -> Self {
        let unique = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "tiffkit-test-{}-{}-{}",
            label,
            std::process::id(),
            unique
        ));
        fs::create_dir_all(&root).expect("create temp dir");
        TempDir { root }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// A little-endian classic TIFF with one IFD of inline-only entries
pub fn classic_le_inline(entries: &[(u16, u16, u32, [u8; 4])]) -> Vec<u8> {
    let mut buf = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, datatype, count, field) in entries {
        buf.extend_from_slice(&tag.to_le_bytes());
        buf.extend_from_slice(&datatype.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(field);
    }
    buf.extend_from_slice(&[0, 0, 0, 0]);
    buf
}

/// A classic little-endian TIFF with ImageWidth/ImageLength plus two strips
///
/// Layout: header (8), IFD with 4 entries (8..62), StripOffsets payload
/// (62..70), StripByteCounts payload (70..78), strip data "ABCD" at 78 and
/// "EFGH" at 82.
pub fn classic_le_with_strips() -> Vec<u8> {
    let mut buf = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&4u16.to_le_bytes());
    // ImageWidth = 2
    buf.extend_from_slice(&256u16.to_le_bytes());
    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&[2, 0, 0, 0]);
    // ImageLength = 4
    buf.extend_from_slice(&257u16.to_le_bytes());
    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&[4, 0, 0, 0]);
    // StripOffsets, LONG x2, out of line at 62
    buf.extend_from_slice(&273u16.to_le_bytes());
    buf.extend_from_slice(&4u16.to_le_bytes());
    buf.extend_from_slice(&2u32.to_le_bytes());
    buf.extend_from_slice(&62u32.to_le_bytes());
    // StripByteCounts, LONG x2, out of line at 70
    buf.extend_from_slice(&279u16.to_le_bytes());
    buf.extend_from_slice(&4u16.to_le_bytes());
    buf.extend_from_slice(&2u32.to_le_bytes());
    buf.extend_from_slice(&70u32.to_le_bytes());
    // next IFD
    buf.extend_from_slice(&[0, 0, 0, 0]);
    // StripOffsets payload
    buf.extend_from_slice(&78u32.to_le_bytes());
    buf.extend_from_slice(&82u32.to_le_bytes());
    // StripByteCounts payload
    buf.extend_from_slice(&4u32.to_le_bytes());
    buf.extend_from_slice(&4u32.to_le_bytes());
    // strip data
    buf.extend_from_slice(b"ABCD");
    buf.extend_from_slice(b"EFGH");
    buf
}

/// A classic little-endian TIFF whose only out-of-line payload is an
/// ImageDescription reading "secret phrase"
pub fn classic_le_with_description() -> Vec<u8> {
    let text = b"secret phrase\0";
    let mut buf = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&270u16.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&(text.len() as u32).to_le_bytes());
    buf.extend_from_slice(&26u32.to_le_bytes());
    buf.extend_from_slice(&[0, 0, 0, 0]);
    buf.extend_from_slice(text);
    buf
}

/// A classic little-endian TIFF with a SubIFDs tag holding three children
///
/// Layout: header (8), main IFD with 2 entries (8..38), SubIFD offsets
/// payload (38..50), three single-entry SubIFDs at 50, 68 and 86.
pub fn classic_le_with_subifds() -> Vec<u8> {
    let mut buf = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&2u16.to_le_bytes());
    // ImageWidth = 99
    buf.extend_from_slice(&256u16.to_le_bytes());
    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&[99, 0, 0, 0]);
    // SubIFDs, IFD x3, out of line at 38
    buf.extend_from_slice(&330u16.to_le_bytes());
    buf.extend_from_slice(&13u16.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes());
    buf.extend_from_slice(&38u32.to_le_bytes());
    // next IFD
    buf.extend_from_slice(&[0, 0, 0, 0]);
    // SubIFD offsets payload
    buf.extend_from_slice(&50u32.to_le_bytes());
    buf.extend_from_slice(&68u32.to_le_bytes());
    buf.extend_from_slice(&86u32.to_le_bytes());
    // the three SubIFDs, each ImageWidth = 10 + index
    for idx in 0..3u8 {
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&256u16.to_le_bytes());
        buf.extend_from_slice(&3u16.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[10 + idx, 0, 0, 0]);
        buf.extend_from_slice(&[0, 0, 0, 0]);
    }
    buf
}
