//! Tests for the tag-set registry

use crate::tiff::constants::{
    resolve_tag, tag_set, tags, Bytecounts, TagSetId,
};
use crate::tiff::datatype::Datatype;
use crate::tiff::errors::TiffError;

#[test]
fn test_lookup_by_id() {
    let set = tag_set(TagSetId::Tiff);
    let desc = set.by_id(256).unwrap();
    assert_eq!(desc.name, "ImageWidth");
    assert_eq!(desc.datatypes, &[Datatype::Short, Datatype::Long][..]);
}

#[test]
fn test_lookup_by_name_case_insensitive() {
    let set = tag_set(TagSetId::Tiff);
    assert_eq!(set.by_name("imagewidth").unwrap().id, 256);
    assert_eq!(set.by_name("IMAGEWIDTH").unwrap().id, 256);
    // altname
    assert_eq!(set.by_name("ImageHeight").unwrap().id, 257);
}

#[test]
fn test_offset_bytecount_pairings() {
    let set = tag_set(TagSetId::Tiff);
    let strips = set.by_id(tags::STRIP_OFFSETS).unwrap();
    assert_eq!(strips.bytecounts, Some(Bytecounts::Tag("StripByteCounts")));
    let tiles = set.by_id(tags::TILE_OFFSETS).unwrap();
    assert_eq!(tiles.bytecounts, Some(Bytecounts::Tag("TileByteCounts")));
    let jpeg = set.by_id(tags::JPEG_IF_OFFSET).unwrap();
    assert_eq!(jpeg.bytecounts, Some(Bytecounts::Tag("JPEGIFByteCount")));
    assert!(set.by_id(tags::STRIP_BYTE_COUNTS).unwrap().bytecounts.is_none());
}

#[test]
fn test_nested_ifd_tags() {
    let set = tag_set(TagSetId::Tiff);
    let sub = set.by_id(tags::SUB_IFD).unwrap();
    assert!(sub.is_ifd);
    assert_eq!(sub.tag_set, Some(TagSetId::Tiff));
    let exif = set.by_id(tags::EXIF_IFD).unwrap();
    assert!(exif.is_ifd);
    assert_eq!(exif.tag_set, Some(TagSetId::Exif));
    let gps = set.by_id(tags::GPS_IFD).unwrap();
    assert_eq!(gps.tag_set, Some(TagSetId::Gps));
}

#[test]
fn test_enum_vocabulary() {
    let set = tag_set(TagSetId::Tiff);
    let compression = set.by_id(tags::COMPRESSION).unwrap();
    assert_eq!(compression.enum_name(7), Some("JPEG"));
    assert_eq!(compression.enum_name(1), Some("None"));
    assert_eq!(compression.enum_name(12345), None);
}

#[test]
fn test_bitfield_vocabulary() {
    let set = tag_set(TagSetId::Tiff);
    let subfile = set.by_id(tags::NEW_SUBFILE_TYPE).unwrap();
    assert_eq!(subfile.bitfield_names(1), vec!["ReducedImage"]);
    assert_eq!(subfile.bitfield_names(3), vec!["ReducedImage", "Page"]);
    assert!(subfile.bitfield_names(0).is_empty());
}

#[test]
fn test_resolve_symbolic_and_numeric() {
    let set = tag_set(TagSetId::Tiff);
    assert_eq!(resolve_tag("ImageDescription", set).unwrap().0, 270);
    // EXIF name resolves through the fallback set list
    assert_eq!(resolve_tag("FNumber", set).unwrap().0, 33437);
    assert_eq!(resolve_tag("0x100", set).unwrap().0, 256);
    assert_eq!(resolve_tag("256", set).unwrap().0, 256);
    // unknown numerics still resolve, without a descriptor
    let (tag, desc) = resolve_tag("60123", set).unwrap();
    assert_eq!(tag, 60123);
    assert!(desc.is_none());
}

#[test]
fn test_resolve_rejects_bad_specs() {
    let set = tag_set(TagSetId::Tiff);
    assert!(matches!(
        resolve_tag("NoSuchTagName", set),
        Err(TiffError::UnknownTag(_))
    ));
    assert!(matches!(
        resolve_tag("70000", set),
        Err(TiffError::UnknownTag(_))
    ));
}

#[test]
fn test_ndpi_flags() {
    let set = tag_set(TagSetId::Tiff);
    assert!(set.by_id(tags::STRIP_OFFSETS).unwrap().ndpi_offset);
    assert!(set.by_id(tags::STRIP_BYTE_COUNTS).unwrap().ndpi_offset);
    assert!(set.by_id(tags::NDPI_MCU_STARTS).unwrap().ndpi_offset);
    assert!(!set.by_id(tags::TILE_OFFSETS).unwrap().ndpi_offset);
}

#[test]
fn test_descriptor_ids_unique_and_sorted() {
    for set_id in [
        TagSetId::Tiff,
        TagSetId::Exif,
        TagSetId::Gps,
        TagSetId::Interop,
        TagSetId::GeoKey,
    ] {
        let ids: Vec<u16> = tag_set(set_id).iter().map(|d| d.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted, "{:?} descriptors are unique and sorted", set_id);
    }
}

#[test]
fn test_gps_and_geokey_sets() {
    assert_eq!(tag_set(TagSetId::Gps).by_id(2).unwrap().name, "GPSLatitude");
    let geo = tag_set(TagSetId::GeoKey);
    assert_eq!(geo.by_id(3072).unwrap().name, "ProjectedCSType");
    assert_eq!(geo.by_name("GTModelTypeGeoKey").unwrap().id, 1024);
}
