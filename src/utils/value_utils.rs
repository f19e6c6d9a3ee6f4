//! Parsing of user-supplied tag values
//!
//! The `set` command accepts loosely typed values: numeric lists separated
//! by commas or whitespace, rationals as `a/b` or value pairs, symbolic
//! enum names, raw ASCII strings, and `@path` to load binary data from a
//! file. This module turns those into a concrete datatype plus canonical
//! payload bytes.

use std::fs;

use log::warn;

use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::TagDescriptor;
use crate::tiff::datatype::Datatype;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::string_utils;

/// A raw value as supplied on the command line
#[derive(Debug, Clone)]
pub enum ValueSource {
    Text(String),
    Binary(Vec<u8>),
}

/// Resolves a command-line value, loading `@path` references from disk
pub fn load_source(value: &str) -> TiffResult<ValueSource> {
    if let Some(path) = value.strip_prefix('@') {
        let bytes = fs::read(path)?;
        Ok(ValueSource::Binary(bytes))
    } else {
        Ok(ValueSource::Text(value.to_string()))
    }
}

/// One parsed numeric token
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

/// Splits a textual value into numeric tokens
///
/// Separators are commas and whitespace; `/` inside rationals also splits,
/// so `300/1` contributes two integers. Enum names resolve through the
/// tag's vocabulary. Returns None as soon as a token is not numeric.
fn numeric_tokens(text: &str, descriptor: Option<&TagDescriptor>) -> Option<Vec<Number>> {
    let normalized = text.replace([',', '/'], " ");
    let mut numbers = Vec::new();
    for token in normalized.split_whitespace() {
        if let Some(desc) = descriptor {
            if let Some((value, _)) = desc
                .enum_values
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(token))
            {
                numbers.push(Number::Int(*value as i128));
                continue;
            }
        }
        if let Some(int) = string_utils::parse_signed_int(token) {
            numbers.push(Number::Int(int as i128));
        } else if let Ok(float) = token.parse::<f64>() {
            numbers.push(Number::Float(float));
        } else {
            return None;
        }
    }
    if numbers.is_empty() {
        None
    } else {
        Some(numbers)
    }
}

/// Attempts to encode numbers as the given datatype
fn encode_numbers(
    datatype: Datatype,
    numbers: &[Number],
    handler: &dyn ByteOrderHandler,
) -> Option<Vec<u8>> {
    let int = |n: &Number| -> Option<i128> {
        match n {
            Number::Int(v) => Some(*v),
            Number::Float(f) if f.fract() == 0.0 => Some(*f as i128),
            _ => None,
        }
    };
    let mut out = Vec::new();
    match datatype {
        Datatype::Byte => {
            for n in numbers {
                let v = int(n)?;
                out.push(u8::try_from(v).ok()?);
            }
        }
        Datatype::SByte => {
            for n in numbers {
                let v = int(n)?;
                out.push(i8::try_from(v).ok()? as u8);
            }
        }
        Datatype::Short => {
            for n in numbers {
                let v = u16::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u16_to_bytes(v));
            }
        }
        Datatype::SShort => {
            for n in numbers {
                let v = i16::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u16_to_bytes(v as u16));
            }
        }
        Datatype::Long | Datatype::Ifd => {
            for n in numbers {
                let v = u32::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u32_to_bytes(v));
            }
        }
        Datatype::SLong => {
            for n in numbers {
                let v = i32::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u32_to_bytes(v as u32));
            }
        }
        Datatype::Long8 | Datatype::Ifd8 => {
            for n in numbers {
                let v = u64::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u64_to_bytes(v));
            }
        }
        Datatype::SLong8 => {
            for n in numbers {
                let v = i64::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u64_to_bytes(v as u64));
            }
        }
        Datatype::Float => {
            for n in numbers {
                let v = match n {
                    Number::Int(i) => *i as f32,
                    Number::Float(f) => *f as f32,
                };
                out.extend_from_slice(&handler.u32_to_bytes(v.to_bits()));
            }
        }
        Datatype::Double => {
            for n in numbers {
                let v = match n {
                    Number::Int(i) => *i as f64,
                    Number::Float(f) => *f,
                };
                out.extend_from_slice(&handler.u64_to_bytes(v.to_bits()));
            }
        }
        Datatype::Rational => {
            if numbers.len() % 2 != 0 {
                return None;
            }
            for n in numbers {
                let v = u32::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u32_to_bytes(v));
            }
        }
        Datatype::SRational => {
            if numbers.len() % 2 != 0 {
                return None;
            }
            for n in numbers {
                let v = i32::try_from(int(n)?).ok()?;
                out.extend_from_slice(&handler.u32_to_bytes(v as u32));
            }
        }
        Datatype::Ascii | Datatype::Undefined => return None,
    }
    Some(out)
}

/// Encodes a value source as the given datatype
fn encode_value(
    datatype: Datatype,
    source: &ValueSource,
    descriptor: Option<&TagDescriptor>,
    handler: &dyn ByteOrderHandler,
) -> Option<Vec<u8>> {
    match datatype {
        Datatype::Ascii => {
            let mut bytes = match source {
                ValueSource::Text(text) => text.clone().into_bytes(),
                ValueSource::Binary(bytes) => {
                    std::str::from_utf8(bytes).ok()?;
                    bytes.clone()
                }
            };
            // Terminating NUL required by the specification
            if bytes.last() != Some(&0) {
                bytes.push(0);
            }
            Some(bytes)
        }
        Datatype::Undefined => Some(match source {
            ValueSource::Text(text) => text.clone().into_bytes(),
            ValueSource::Binary(bytes) => bytes.clone(),
        }),
        _ => match source {
            ValueSource::Text(text) => {
                let numbers = numeric_tokens(text, descriptor)?;
                encode_numbers(datatype, &numbers, handler)
            }
            ValueSource::Binary(_) => None,
        },
    }
}

/// The inference order used when neither the tag nor the user names a type
const INFERENCE_ORDER: [Datatype; 10] = [
    Datatype::Byte,
    Datatype::Short,
    Datatype::Long,
    Datatype::Long8,
    Datatype::SByte,
    Datatype::SShort,
    Datatype::SLong,
    Datatype::SLong8,
    Datatype::Double,
    Datatype::Ascii,
];

/// Parses a value into a datatype and canonical payload bytes
///
/// Resolution order: an explicit `:DATATYPE` override, then the tag's
/// declared datatypes, then the general inference order, finally falling
/// back to UNDEFINED raw bytes.
pub fn parse_value(
    source: &ValueSource,
    datatype_override: Option<Datatype>,
    descriptor: Option<&TagDescriptor>,
    handler: &dyn ByteOrderHandler,
) -> TiffResult<(Datatype, Vec<u8>)> {
    if let Some(datatype) = datatype_override {
        return match encode_value(datatype, source, descriptor, handler) {
            Some(bytes) => Ok((datatype, bytes)),
            None => Err(TiffError::InvalidValue(format!(
                "value cannot be converted to datatype {}",
                datatype
            ))),
        };
    }

    if let Some(desc) = descriptor {
        for &datatype in desc.datatypes {
            if let Some(bytes) = encode_value(datatype, source, Some(desc), handler) {
                return Ok((datatype, bytes));
            }
        }
        if !desc.datatypes.is_empty() {
            warn!(
                "Value does not fit the declared datatypes for tag {}",
                desc.name
            );
        }
    }

    for datatype in INFERENCE_ORDER {
        if let Some(bytes) = encode_value(datatype, source, descriptor, handler) {
            return Ok((datatype, bytes));
        }
    }
    let bytes = encode_value(Datatype::Undefined, source, descriptor, handler)
        .expect("UNDEFINED encoding never fails");
    Ok((Datatype::Undefined, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::LittleEndianHandler;
    use crate::tiff::constants::{tag_set, tags, TagSetId};

    #[test]
    fn test_parse_short_list() {
        let source = ValueSource::Text("1 2, 3".to_string());
        let (datatype, bytes) =
            parse_value(&source, None, None, &LittleEndianHandler).unwrap();
        assert_eq!(datatype, Datatype::Byte);
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_with_override() {
        let source = ValueSource::Text("64".to_string());
        let (datatype, bytes) =
            parse_value(&source, Some(Datatype::Short), None, &LittleEndianHandler).unwrap();
        assert_eq!(datatype, Datatype::Short);
        assert_eq!(bytes, vec![64, 0]);
    }

    #[test]
    fn test_parse_enum_name() {
        let desc = tag_set(TagSetId::Tiff).by_id(tags::COMPRESSION).unwrap();
        let source = ValueSource::Text("JPEG".to_string());
        let (datatype, bytes) =
            parse_value(&source, None, Some(desc), &LittleEndianHandler).unwrap();
        assert_eq!(datatype, Datatype::Short);
        assert_eq!(bytes, vec![7, 0]);
    }

    #[test]
    fn test_parse_rational() {
        let desc = tag_set(TagSetId::Tiff).by_name("XResolution").unwrap();
        let source = ValueSource::Text("300/1".to_string());
        let (datatype, bytes) =
            parse_value(&source, None, Some(desc), &LittleEndianHandler).unwrap();
        assert_eq!(datatype, Datatype::Rational);
        assert_eq!(bytes, vec![44, 1, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_parse_ascii_appends_nul() {
        let source = ValueSource::Text("hello".to_string());
        let (datatype, bytes) = parse_value(
            &source,
            Some(Datatype::Ascii),
            None,
            &LittleEndianHandler,
        )
        .unwrap();
        assert_eq!(datatype, Datatype::Ascii);
        assert_eq!(bytes, b"hello\0");
    }

    #[test]
    fn test_negative_infers_signed() {
        let source = ValueSource::Text("-3".to_string());
        let (datatype, _) = parse_value(&source, None, None, &LittleEndianHandler).unwrap();
        assert_eq!(datatype, Datatype::SByte);
    }

    #[test]
    fn test_non_numeric_infers_ascii() {
        let source = ValueSource::Text("public phrase".to_string());
        let (datatype, bytes) = parse_value(&source, None, None, &LittleEndianHandler).unwrap();
        assert_eq!(datatype, Datatype::Ascii);
        assert_eq!(bytes, b"public phrase\0");
    }
}
