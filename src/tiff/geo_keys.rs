//! GeoTIFF GeoKey decoding
//!
//! GeoKeys form a second-level directory encoded inside the
//! GeoKeyDirectoryTag payload: a 4-short header followed by 4-short key
//! entries. Values live inline, in GeoDoubleParamsTag or in
//! GeoAsciiParamsTag. This module decodes them from the in-memory model for
//! display purposes only; the raw payloads remain authoritative.

use log::warn;

use crate::tiff::constants::{self, tags, TagSetId};
use crate::tiff::ifd::{DecodedValue, Ifd};

/// A decoded GeoKey value
#[derive(Debug, Clone, PartialEq)]
pub enum GeoValue {
    Shorts(Vec<u64>),
    Doubles(Vec<f64>),
    Ascii(String),
}

/// One decoded GeoKey
#[derive(Debug, Clone)]
pub struct GeoKey {
    pub key_id: u16,
    pub name: String,
    pub value: GeoValue,
}

impl GeoKey {
    /// Renders the value for human-readable output
    pub fn value_string(&self) -> String {
        match &self.value {
            GeoValue::Shorts(values) => values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            GeoValue::Doubles(values) => values
                .iter()
                .map(|v| format!("{}", v))
                .collect::<Vec<_>>()
                .join(" "),
            GeoValue::Ascii(text) => text.clone(),
        }
    }
}

/// Decodes the GeoKey directory of an IFD, if it has one
///
/// Returns None when the IFD has no GeoKeyDirectoryTag or the directory
/// header is malformed. Unknown key IDs are kept (named by number) and
/// logged as warnings.
pub fn decode_geo_keys(ifd: &Ifd) -> Option<Vec<GeoKey>> {
    let entry = ifd.get_entry(tags::GEO_KEY_DIRECTORY)?;
    let handler = ifd.handler();
    let values = entry.decoded_u64s(handler.as_ref())?;
    if values.len() < 4 {
        return None;
    }
    let version = (values[0], values[1], values[2]);
    if version != (1, 1, 0) && version != (1, 1, 1) {
        return None;
    }
    if values[3] * 4 + 4 != values.len() as u64 {
        return None;
    }

    let doubles: Vec<f64> = ifd
        .get_entry(tags::GEO_DOUBLE_PARAMS)
        .and_then(|e| e.decoded_values(handler.as_ref()))
        .map(|decoded| {
            decoded
                .iter()
                .filter_map(|v| match v {
                    DecodedValue::Float(f) => Some(*f),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    let asciis: String = ifd
        .get_entry(tags::GEO_ASCII_PARAMS)
        .and_then(|e| e.decoded_ascii())
        .unwrap_or_default();

    let key_set = constants::tag_set(TagSetId::GeoKey);
    let mut keys = Vec::new();
    for chunk in values[4..].chunks_exact(4) {
        let (key_id, location, count, offset) =
            (chunk[0] as u16, chunk[1] as u16, chunk[2] as usize, chunk[3]);
        if key_set.by_id(key_id).is_none() {
            warn!("Unknown GeoKey {} in GeoKeyDirectory", key_id);
        }
        let value = if location == 0 {
            GeoValue::Shorts(vec![offset])
        } else if location == tags::GEO_DOUBLE_PARAMS {
            let start = (offset as usize).min(doubles.len());
            let end = (start + count).min(doubles.len());
            GeoValue::Doubles(doubles[start..end].to_vec())
        } else if location == tags::GEO_ASCII_PARAMS {
            let bytes = asciis.as_bytes();
            let start = (offset as usize).min(bytes.len());
            let end = (start + count).min(bytes.len());
            let mut text = String::from_utf8_lossy(&bytes[start..end]).to_string();
            if text.ends_with('|') {
                text.pop();
            }
            GeoValue::Ascii(text)
        } else {
            warn!("GeoKey {} stored in unexpected tag {}", key_id, location);
            GeoValue::Shorts(vec![offset])
        };
        keys.push(GeoKey {
            key_id,
            name: key_set.tag_name(key_id),
            value,
        });
    }
    Some(keys)
}
