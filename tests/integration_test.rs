//! End-to-end tests for the tiffkit library surface

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use tiffkit::tiff::constants::tags;
use tiffkit::tiff::dump::{dump_info, DumpFormat, DumpOptions};
use tiffkit::utils::logger::Logger;
use tiffkit::utils::value_utils::{self, ValueSource};
use tiffkit::{Datatype, TagEntry, TiffReader, TiffWriter, Tiffkit, WriteOptions};

struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new(label: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "tiffkit-integration-{}-{}",
            label,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).expect("create scratch dir");
        Scratch { root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// A classic little-endian TIFF with one strip of the given pixel bytes
fn strip_tiff(pixels: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&4u16.to_le_bytes());
    for (tag, value) in [(256u16, pixels.len() as u32), (257, 1)] {
        buf.extend_from_slice(&tag.to_le_bytes());
        buf.extend_from_slice(&3u16.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&value.to_le_bytes());
    }
    // StripOffsets: single strip right after the IFD (inline LONG)
    let data_offset = 8 + 2 + 4 * 12 + 4;
    buf.extend_from_slice(&273u16.to_le_bytes());
    buf.extend_from_slice(&4u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&(data_offset as u32).to_le_bytes());
    // StripByteCounts
    buf.extend_from_slice(&279u16.to_le_bytes());
    buf.extend_from_slice(&4u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
    buf.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(buf.len(), data_offset);
    buf.extend_from_slice(pixels);
    buf
}

/// A classic little-endian TIFF whose ImageDescription says "secret phrase"
fn description_tiff() -> Vec<u8> {
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
fn subifd_tiff() -> Vec<u8> {
    let mut buf = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&256u16.to_le_bytes());
    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&[99, 0, 0, 0]);
    buf.extend_from_slice(&330u16.to_le_bytes());
    buf.extend_from_slice(&13u16.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes());
    buf.extend_from_slice(&38u32.to_le_bytes());
    buf.extend_from_slice(&[0, 0, 0, 0]);
    buf.extend_from_slice(&50u32.to_le_bytes());
    buf.extend_from_slice(&68u32.to_le_bytes());
    buf.extend_from_slice(&86u32.to_le_bytes());
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

#[test]
fn test_complete_tiff_workflow() {
    // Create a sample TIFF file in memory
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x49, 0x49]); // "II" for little-endian
    buffer.extend_from_slice(&[42, 0]); // TIFF magic number
    buffer.extend_from_slice(&[8, 0, 0, 0]); // Offset to first IFD

    buffer.extend_from_slice(&[2, 0]); // Number of entries
    buffer.extend_from_slice(&[0, 1]); // Tag (256)
    buffer.extend_from_slice(&[4, 0]); // Type (LONG)
    buffer.extend_from_slice(&[1, 0, 0, 0]); // Count
    buffer.extend_from_slice(&[200, 0, 0, 0]); // Value (width = 200)
    buffer.extend_from_slice(&[1, 1]); // Tag (257)
    buffer.extend_from_slice(&[4, 0]); // Type (LONG)
    buffer.extend_from_slice(&[1, 0, 0, 0]); // Count
    buffer.extend_from_slice(&[100, 0, 0, 0]); // Value (height = 100)
    buffer.extend_from_slice(&[0, 0, 0, 0]); // No more IFDs

    let mut cursor = Cursor::new(buffer);
    let logger = Logger::stderr_only();
    let mut reader = TiffReader::new(&logger);

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(!tiff.big_tiff);
    assert_eq!(tiff.ifds.len(), 1);

    let ifd = &tiff.ifds[0];
    assert_eq!(ifd.entry_count(), 2);
    assert_eq!(ifd.dimensions(), Some((200, 100)));
}

#[test]
fn test_secret_removal() {
    let scratch = Scratch::new("secret");
    let input = scratch.path("in.tif");
    fs::write(&input, description_tiff()).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let mut info = kit.read_tiff(&input).unwrap();
    assert_eq!(
        info.ifds[0].get_entry(tags::IMAGE_DESCRIPTION).unwrap().decoded_ascii(),
        Some("secret phrase".to_string())
    );

    // replace the description the way the set command does
    let descriptor = tiffkit::tiff::constants::tag_set(tiffkit::tiff::constants::TagSetId::Tiff)
        .by_id(tags::IMAGE_DESCRIPTION);
    let handler = info.handler();
    let (datatype, bytes) = value_utils::parse_value(
        &ValueSource::Text("public phrase".to_string()),
        None,
        descriptor,
        handler.as_ref(),
    )
    .unwrap();
    assert_eq!(datatype, Datatype::Ascii);
    info.ifds[0].add_entry(TagEntry::new_raw(tags::IMAGE_DESCRIPTION, datatype, bytes));

    let output = scratch.path("out.tif");
    kit.write_tiff(&info, &output, &WriteOptions::default()).unwrap();

    let out_bytes = fs::read(&output).unwrap();
    assert!(!out_bytes.windows(6).any(|w| w == b"secret"));
    assert!(out_bytes.windows(13).any(|w| w == b"public phrase"));

    let reread = kit.read_tiff(&output).unwrap();
    assert_eq!(
        reread.ifds[0].get_entry(tags::IMAGE_DESCRIPTION).unwrap().decoded_ascii(),
        Some("public phrase".to_string())
    );
}

#[test]
fn test_concat_round_trip() {
    let scratch = Scratch::new("concat");
    let a = scratch.path("a.tif");
    let b = scratch.path("b.tif");
    fs::write(&a, strip_tiff(b"AAAAAAAA")).unwrap();
    fs::write(&b, strip_tiff(b"BBBBBBBB")).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let output = scratch.path("c.tif");
    kit.concat(&[a.clone(), b.clone()], output.clone(), false).unwrap();

    let combined = kit.read_tiff(&output).unwrap();
    assert_eq!(combined.ifds.len(), 2);

    let original_a = kit.read_tiff(&a).unwrap();
    let tags_a: Vec<u16> = original_a.ifds[0].entries.keys().copied().collect();
    let tags_0: Vec<u16> = combined.ifds[0].entries.keys().copied().collect();
    assert_eq!(tags_a, tags_0);
    let tags_1: Vec<u16> = combined.ifds[1].entries.keys().copied().collect();
    assert_eq!(tags_a, tags_1);

    // pixel bytes survive with reassigned offsets
    let out_bytes = fs::read(&output).unwrap();
    let handler = combined.ifds[0].handler();
    for (idx, expected) in [b"AAAAAAAA", b"BBBBBBBB"].iter().enumerate() {
        let offsets = combined.ifds[idx]
            .get_entry(tags::STRIP_OFFSETS)
            .unwrap()
            .decoded_u64s(handler.as_ref())
            .unwrap();
        let counts = combined.ifds[idx]
            .get_entry(tags::STRIP_BYTE_COUNTS)
            .unwrap()
            .decoded_u64s(handler.as_ref())
            .unwrap();
        assert_eq!(counts, vec![8]);
        let start = offsets[0] as usize;
        assert_eq!(&out_bytes[start..start + 8], *expected);
    }
}

#[test]
fn test_concat_single_file_preserves_model() {
    let scratch = Scratch::new("concat-single");
    let a = scratch.path("a.tif");
    fs::write(&a, strip_tiff(b"XYZW")).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let output = scratch.path("out.tif");
    kit.concat(&[a.clone()], output.clone(), false).unwrap();

    let original = kit.read_tiff(&a).unwrap();
    let rewritten = kit.read_tiff(&output).unwrap();
    assert_eq!(original.ifds.len(), rewritten.ifds.len());
    let tags_a: Vec<u16> = original.ifds[0].entries.keys().copied().collect();
    let tags_b: Vec<u16> = rewritten.ifds[0].entries.keys().copied().collect();
    assert_eq!(tags_a, tags_b);
}

#[test]
fn test_split_with_subifds() {
    let scratch = Scratch::new("split");
    let input = scratch.path("in.tif");
    fs::write(&input, subifd_tiff()).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let prefix = scratch.path("part-").display().to_string();
    let written = kit.split(&input, Some(prefix.as_str()), true, false).unwrap();
    assert_eq!(written, 4);

    // every split file opens as a valid single-IFD TIFF
    let expected_widths = [99u64, 10, 11, 12];
    for (idx, suffix) in ["aaa", "aab", "aac", "aad"].iter().enumerate() {
        let path = scratch.path(&format!("part-{}.tif", suffix));
        let info = kit.read_tiff(&path).unwrap();
        assert_eq!(info.ifds.len(), 1, "split file {} has one IFD", suffix);
        assert_eq!(info.ifds[0].tag_value(tags::IMAGE_WIDTH), Some(expected_widths[idx]));
        // SubIFD children are not carried into split outputs
        assert!(info.ifds[0].get_entry(tags::SUB_IFD).is_none());
    }
}

#[test]
fn test_split_without_subifds_keeps_children() {
    let scratch = Scratch::new("split-keep");
    let input = scratch.path("in.tif");
    fs::write(&input, subifd_tiff()).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let prefix = scratch.path("whole-").display().to_string();
    let written = kit.split(&input, Some(prefix.as_str()), false, false).unwrap();
    assert_eq!(written, 1);

    let info = kit.read_tiff(&scratch.path("whole-aaa.tif")).unwrap();
    let chains = info.ifds[0].get_entry(tags::SUB_IFD).unwrap().sub_ifds().unwrap();
    assert_eq!(chains.len(), 3);
}

#[test]
fn test_dump_text_output() {
    let scratch = Scratch::new("dump");
    let input = scratch.path("in.tif");
    fs::write(&input, strip_tiff(b"PQRS")).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let mut out = Vec::new();
    kit.dump(&input, &DumpOptions::default(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Header: 0x4949 <little-endian> <ClassicTIFF>"));
    assert!(text.contains("Directory 0"));
    assert!(text.contains("ImageWidth"));
    assert!(text.contains("StripByteCounts"));
}

#[test]
fn test_dump_json_output() {
    let scratch = Scratch::new("dump-json");
    let input = scratch.path("in.tif");
    fs::write(&input, strip_tiff(b"PQRS")).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let info = kit.read_tiff(&input).unwrap();
    let mut out = Vec::new();
    let options = DumpOptions {
        format: DumpFormat::Json,
        ..DumpOptions::default()
    };
    dump_info(&info, &options, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["bigtiff"], serde_json::json!(false));
    assert_eq!(value["ifds"][0]["tags"]["256"]["data"][0], serde_json::json!(4));
}

#[test]
fn test_dump_yaml_output() {
    let scratch = Scratch::new("dump-yaml");
    let input = scratch.path("in.tif");
    fs::write(&input, strip_tiff(b"PQRS")).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    let mut out = Vec::new();
    let options = DumpOptions {
        format: DumpFormat::Yaml,
        ..DumpOptions::default()
    };
    kit.dump(&input, &options, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("header:"));
    assert!(text.contains("  endian: little"));
    assert!(text.contains("ImageWidth: 4"));
}

#[test]
fn test_unset_tag_facade() {
    let scratch = Scratch::new("unset");
    let input = scratch.path("in.tif");
    fs::write(&input, description_tiff()).unwrap();

    let kit = Tiffkit::new(None).unwrap();
    assert_eq!(kit.sub_ifd_tags(), vec![330, 34665, 34853, 40965]);

    let output = scratch.path("out.tif");
    kit.unset_tag(input, output.clone(), tags::IMAGE_DESCRIPTION).unwrap();
    let reread = kit.read_tiff(&output).unwrap();
    assert!(reread.ifds[0].get_entry(tags::IMAGE_DESCRIPTION).is_none());
    let out_bytes = fs::read(&output).unwrap();
    assert!(!out_bytes.windows(6).any(|w| w == b"secret"));
}

#[test]
fn test_write_from_cursor_model_without_source_data() {
    // a model read from a stream has no source path; writing it works as
    // long as no offset/bytecount data must be copied
    let logger = Logger::stderr_only();
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(description_tiff());
    let info = reader.read(&mut cursor).unwrap();

    let scratch = Scratch::new("cursor-model");
    let output = scratch.path("out.tif");
    TiffWriter::write(&info, &output, &WriteOptions::default()).unwrap();
    let out_bytes = fs::read(&output).unwrap();
    assert!(out_bytes.windows(6).any(|w| w == b"secret"));
}
