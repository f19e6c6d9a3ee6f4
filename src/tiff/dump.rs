//! Human-readable renderings of the TIFF model
//!
//! Text, JSON and YAML renderers over a `TiffInfo`. Every IFD, tag,
//! datatype and decoded value is reachable from here; the registry supplies
//! symbolic names, enum vocabularies and bitfield decompositions.

use std::io::Write;

use serde_json::json;

use crate::tiff::constants::{self, tags, TagDescriptor, TagSetId};
use crate::tiff::datatype::Datatype;
use crate::tiff::errors::TiffResult;
use crate::tiff::geo_keys;
use crate::tiff::ifd::{DecodedValue, Ifd, TagEntry};
use crate::tiff::types::TiffInfo;
use crate::utils::string_utils;

/// Output format for dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Text,
    Json,
    Yaml,
}

/// Rendering options for dump
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Maximum number of list items to print per tag
    pub max_items: usize,
    /// Maximum length of a text value, None for unlimited
    pub max_text: Option<usize>,
    /// Output format
    pub format: DumpFormat,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            max_items: 20,
            max_text: None,
            format: DumpFormat::Text,
        }
    }
}

/// Renders a TIFF model to the destination stream
pub fn dump_info(
    info: &TiffInfo,
    options: &DumpOptions,
    dest: &mut dyn Write,
) -> TiffResult<()> {
    match options.format {
        DumpFormat::Text => dump_text(info, options, dest),
        DumpFormat::Json => {
            serde_json::to_writer_pretty(&mut *dest, &to_json(info, options))
                .map_err(|e| crate::tiff::errors::TiffError::GenericError(e.to_string()))?;
            writeln!(dest)?;
            Ok(())
        }
        DumpFormat::Yaml => dump_yaml(info, options, dest),
    }
}

/// The display name of a tag: `Name 256 (0x100)` or `256 (0x100)`
fn tag_label(tag: u16, set_id: TagSetId) -> String {
    match constants::tag_set(set_id).by_id(tag) {
        Some(desc) => format!("{} {} (0x{:X})", desc.name, tag, tag),
        None => format!("{} (0x{:X})", tag, tag),
    }
}

fn dump_text(info: &TiffInfo, options: &DumpOptions, dest: &mut dyn Write) -> TiffResult<()> {
    let header = if info.big_endian { [0x4Du8, 0x4D] } else { [0x49u8, 0x49] };
    writeln!(
        dest,
        "Header: 0x{:02x}{:02x} <{}-endian> <{}TIFF>",
        header[0],
        header[1],
        if info.big_endian { "big" } else { "little" },
        if info.big_tiff { "Big" } else { "Classic" }
    )?;
    dump_ifds_text(&info.ifds, options, dest, "", "")?;
    Ok(())
}

fn dump_ifds_text(
    ifds: &[Ifd],
    options: &DumpOptions,
    dest: &mut dyn Write,
    dir_prefix: &str,
    line_prefix: &str,
) -> TiffResult<()> {
    for (idx, ifd) in ifds.iter().enumerate() {
        writeln!(
            dest,
            "{}Directory {}{}: offset {} (0x{:x})",
            line_prefix, dir_prefix, idx, ifd.offset, ifd.offset
        )?;
        let set = constants::tag_set(ifd.tag_set);
        let mut sub_tags = Vec::new();
        for entry in ifd.entries.values() {
            if entry.sub_ifds().is_some() {
                sub_tags.push(entry);
                continue;
            }
            dump_tag_text(entry, ifd, set.id, options, dest, line_prefix)?;
        }
        for entry in sub_tags {
            let sub_prefix = format!("{}  ", line_prefix);
            let name = set.tag_name(entry.tag);
            if let Some(chains) = entry.sub_ifds() {
                for (sub_idx, chain) in chains.iter().enumerate() {
                    writeln!(dest, "{}{}:{}", sub_prefix, name, sub_idx)?;
                    dump_ifds_text(
                        chain,
                        options,
                        dest,
                        &format!("{}{},{}:{},", dir_prefix, idx, name, sub_idx),
                        &format!("{}  ", sub_prefix),
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn dump_tag_text(
    entry: &TagEntry,
    ifd: &Ifd,
    set_id: TagSetId,
    options: &DumpOptions,
    dest: &mut dyn Write,
    line_prefix: &str,
) -> TiffResult<()> {
    let descriptor = constants::tag_set(set_id).by_id(entry.tag);
    write!(
        dest,
        "{}  {} {}:",
        line_prefix,
        tag_label(entry.tag, set_id),
        entry.datatype
    )?;

    let handler = ifd.handler();
    if let Some(values) = entry.decoded_values(handler.as_ref()) {
        if values.len() != 1 {
            write!(dest, " <{}>", values.len())?;
        }
        for value in values.iter().take(options.max_items) {
            write_value_text(dest, value, entry.datatype, descriptor)?;
        }
        if values.len() > options.max_items {
            write!(dest, " ...")?;
        }
    } else if entry.datatype.is_ascii() {
        match entry.decoded_ascii() {
            Some(text) => {
                let truncated = options.max_text.map_or(false, |max| text.len() > max);
                if truncated {
                    let max = options.max_text.unwrap();
                    write!(dest, " <{}> {} ...", text.len(), &text[..max])?;
                } else {
                    write!(dest, " {}", text)?;
                }
            }
            None => {
                let raw = entry.raw().unwrap_or(&[]);
                write!(
                    dest,
                    " <{}> {}",
                    raw.len(),
                    string_utils::bytes_repr(&raw[..raw.len().min(options.max_items)])
                )?;
            }
        }
    } else {
        let raw = entry.raw().unwrap_or(&[]);
        write!(
            dest,
            " <{}> {}",
            raw.len(),
            string_utils::bytes_repr(&raw[..raw.len().min(options.max_items)])
        )?;
        if raw.len() > options.max_items {
            write!(dest, " ...")?;
        }
    }
    writeln!(dest)?;

    if entry.tag == tags::GEO_KEY_DIRECTORY {
        if let Some(keys) = geo_keys::decode_geo_keys(ifd) {
            for key in keys {
                writeln!(
                    dest,
                    "{}      {}: {}",
                    line_prefix,
                    key.name,
                    key.value_string()
                )?;
            }
        }
    }
    Ok(())
}

fn write_value_text(
    dest: &mut dyn Write,
    value: &DecodedValue,
    datatype: Datatype,
    descriptor: Option<&TagDescriptor>,
) -> TiffResult<()> {
    match value {
        DecodedValue::Unsigned(v) => write!(dest, " {}", v)?,
        DecodedValue::Signed(v) => write!(dest, " {}", v)?,
        DecodedValue::Float(v) => write!(dest, " {}", v)?,
        DecodedValue::Rational(n, d) => {
            if *d != 0 {
                write!(dest, " {} {} ({:.8})", n, d, *n as f64 / *d as f64)?;
            } else {
                write!(dest, " {} {}", n, d)?;
            }
        }
        DecodedValue::SRational(n, d) => {
            if *d != 0 {
                write!(dest, " {} {} ({:.8})", n, d, *n as f64 / *d as f64)?;
            } else {
                write!(dest, " {} {}", n, d)?;
            }
        }
    }
    if let (Some(desc), Some(v)) = (descriptor, value.as_u64()) {
        if let Some(name) = desc.enum_name(v) {
            write!(dest, " ({})", name)?;
            if datatype == Datatype::Short && desc.id == tags::COMPRESSION
                && constants::is_lossy_compression(v)
            {
                write!(dest, " (lossy)")?;
            }
        }
        if v != 0 {
            let bits = desc.bitfield_names(v);
            if !bits.is_empty() {
                write!(dest, " ({})", bits.join(", "))?;
            }
        }
    }
    Ok(())
}

/// Builds the JSON representation of a model
pub fn to_json(info: &TiffInfo, options: &DumpOptions) -> serde_json::Value {
    json!({
        "path": info.path.as_ref().map(|p| p.display().to_string()),
        "size": info.size,
        "bigEndian": info.big_endian,
        "bigtiff": info.big_tiff,
        "firstifd": info.first_ifd_offset,
        "warnings": info.warnings,
        "ifds": info.ifds.iter().map(|ifd| ifd_to_json(ifd, options)).collect::<Vec<_>>(),
    })
}

fn ifd_to_json(ifd: &Ifd, options: &DumpOptions) -> serde_json::Value {
    let mut tags_map = serde_json::Map::new();
    let handler = ifd.handler();
    for entry in ifd.entries.values() {
        let mut record = serde_json::Map::new();
        record.insert("datatype".to_string(), json!(entry.datatype.code()));
        record.insert("count".to_string(), json!(entry.count));
        if let Some(chains) = entry.sub_ifds() {
            record.insert(
                "ifds".to_string(),
                json!(chains
                    .iter()
                    .map(|chain| chain
                        .iter()
                        .map(|sub| ifd_to_json(sub, options))
                        .collect::<Vec<_>>())
                    .collect::<Vec<_>>()),
            );
        } else if let Some(values) = entry.decoded_values(handler.as_ref()) {
            let data: Vec<serde_json::Value> = values
                .iter()
                .flat_map(|v| match v {
                    DecodedValue::Unsigned(u) => vec![json!(u)],
                    DecodedValue::Signed(s) => vec![json!(s)],
                    DecodedValue::Float(f) => vec![json!(f)],
                    DecodedValue::Rational(n, d) => vec![json!(n), json!(d)],
                    DecodedValue::SRational(n, d) => vec![json!(n), json!(d)],
                })
                .collect();
            record.insert("data".to_string(), json!(data));
        } else if entry.datatype.is_ascii() {
            match entry.decoded_ascii() {
                Some(text) => record.insert("data".to_string(), json!(text)),
                None => record.insert(
                    "data".to_string(),
                    json!(string_utils::bytes_repr(entry.raw().unwrap_or(&[]))),
                ),
            };
        } else {
            record.insert(
                "data".to_string(),
                json!(string_utils::bytes_repr(entry.raw().unwrap_or(&[]))),
            );
        }
        tags_map.insert(entry.tag.to_string(), serde_json::Value::Object(record));
    }
    json!({
        "offset": ifd.offset,
        "bigEndian": ifd.big_endian,
        "bigtiff": ifd.big_tiff,
        "tagcount": ifd.entry_count(),
        "tags": serde_json::Value::Object(tags_map),
    })
}

fn dump_yaml(info: &TiffInfo, options: &DumpOptions, dest: &mut dyn Write) -> TiffResult<()> {
    writeln!(dest, "header:")?;
    writeln!(
        dest,
        "  endian: {}",
        if info.big_endian { "big" } else { "little" }
    )?;
    writeln!(
        dest,
        "  bigTiff: {}",
        if info.big_tiff { "true" } else { "false" }
    )?;
    writeln!(dest, "ifds:")?;
    dump_ifds_yaml(&info.ifds, options, dest, "", "  ")?;
    Ok(())
}

fn dump_ifds_yaml(
    ifds: &[Ifd],
    options: &DumpOptions,
    dest: &mut dyn Write,
    dir_prefix: &str,
    indent: &str,
) -> TiffResult<()> {
    for (idx, ifd) in ifds.iter().enumerate() {
        writeln!(
            dest,
            "{}{}:",
            indent,
            string_utils::yaml_escape(&format!("Directory {}{}", dir_prefix, idx))
        )?;
        let set = constants::tag_set(ifd.tag_set);
        let handler = ifd.handler();
        for entry in ifd.entries.values() {
            let key = string_utils::yaml_escape(&set.tag_name(entry.tag));
            if let Some(chains) = entry.sub_ifds() {
                writeln!(dest, "{}  {}:", indent, key)?;
                for (sub_idx, chain) in chains.iter().enumerate() {
                    writeln!(dest, "{}  -", indent)?;
                    dump_ifds_yaml(
                        chain,
                        options,
                        dest,
                        &format!("{}{},{}:{},", dir_prefix, idx, set.tag_name(entry.tag), sub_idx),
                        &format!("{}    ", indent),
                    )?;
                }
                continue;
            }
            write!(dest, "{}  {}:", indent, key)?;
            let descriptor = set.by_id(entry.tag);
            if let Some(values) = entry.decoded_values(handler.as_ref()) {
                if values.len() == 1 {
                    write_value_yaml(dest, &values[0], descriptor)?;
                } else {
                    let rendered: Vec<String> = values
                        .iter()
                        .take(options.max_items)
                        .map(yaml_scalar)
                        .collect();
                    write!(dest, " [{}", rendered.join(", "))?;
                    if values.len() > options.max_items {
                        write!(dest, ", ...")?;
                    }
                    write!(dest, "]")?;
                }
            } else if entry.datatype.is_ascii() {
                let text = entry
                    .decoded_ascii()
                    .unwrap_or_else(|| string_utils::bytes_repr(entry.raw().unwrap_or(&[])));
                let shown = match options.max_text {
                    Some(max) if text.len() > max => format!("{} ...", &text[..max]),
                    _ => text,
                };
                write!(dest, " {}", string_utils::yaml_escape(&shown))?;
            } else {
                let raw = entry.raw().unwrap_or(&[]);
                let repr = string_utils::bytes_repr(&raw[..raw.len().min(options.max_items)]);
                write!(dest, " {}", string_utils::yaml_escape(&repr))?;
            }
            writeln!(dest)?;
        }
    }
    Ok(())
}

fn yaml_scalar(value: &DecodedValue) -> String {
    match value {
        DecodedValue::Unsigned(v) => v.to_string(),
        DecodedValue::Signed(v) => v.to_string(),
        DecodedValue::Float(v) => v.to_string(),
        DecodedValue::Rational(n, d) => format!("[{}, {}]", n, d),
        DecodedValue::SRational(n, d) => format!("[{}, {}]", n, d),
    }
}

fn write_value_yaml(
    dest: &mut dyn Write,
    value: &DecodedValue,
    descriptor: Option<&TagDescriptor>,
) -> TiffResult<()> {
    if let (Some(desc), Some(v)) = (descriptor, value.as_u64()) {
        if let Some(name) = desc.enum_name(v) {
            write!(dest, " {}", string_utils::yaml_escape(name))?;
            return Ok(());
        }
    }
    write!(dest, " {}", yaml_scalar(value))?;
    Ok(())
}
