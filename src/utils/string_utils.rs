//! String handling utilities

/// Removes trailing null bytes from a buffer in place
pub fn trim_trailing_nulls(buffer: &mut Vec<u8>) {
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
}

/// Parses an integer that may be decimal or prefixed hex (`0x…`)
pub fn parse_int(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse::<u64>().ok()
    }
}

/// Parses a signed integer that may be decimal or prefixed hex
pub fn parse_signed_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix('-') {
        parse_int(rest).map(|v| -(v as i64))
    } else {
        parse_int(trimmed).map(|v| v as i64)
    }
}

/// Escapes a string for use as a YAML key or scalar
///
/// Plain identifiers pass through unquoted; anything else is quoted with
/// backslash escapes.
pub fn yaml_escape(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !key.chars().next().unwrap().is_ascii_digit();
    if plain {
        key.to_string()
    } else {
        let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    }
}

/// Renders a byte buffer for display, printable ASCII kept as-is and
/// everything else as `\xNN`
pub fn bytes_repr(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push('\'');
    for &b in bytes {
        match b {
            0x20..=0x7e if b != b'\'' && b != b'\\' => out.push(b as char),
            b'\'' => out.push_str("\\'"),
            b'\\' => out.push_str("\\\\"),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_nulls() {
        let mut buf = vec![b'a', b'b', 0, 0];
        trim_trailing_nulls(&mut buf);
        assert_eq!(buf, b"ab");

        let mut empty = vec![0u8, 0];
        trim_trailing_nulls(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("256"), Some(256));
        assert_eq!(parse_int("0x100"), Some(256));
        assert_eq!(parse_int(" 0X2a "), Some(42));
        assert_eq!(parse_int("tag"), None);
    }

    #[test]
    fn test_yaml_escape() {
        assert_eq!(yaml_escape("ImageWidth"), "ImageWidth");
        assert_eq!(yaml_escape("Directory 0"), "\"Directory 0\"");
        assert_eq!(yaml_escape("a\"b"), "\"a\\\"b\"");
    }
}
