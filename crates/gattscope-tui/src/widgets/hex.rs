//! Hex value parsing and formatting helpers.

/// Why a hex string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexParseError {
    /// A character outside `[0-9a-fA-F]` and the accepted separators.
    InvalidDigit(char),
    /// The digit count is odd — bytes need two digits each.
    OddLength,
    /// Nothing to parse.
    Empty,
}

impl std::fmt::Display for HexParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDigit(c) => write!(f, "invalid hex digit '{c}'"),
            Self::OddLength => f.write_str("odd number of hex digits"),
            Self::Empty => f.write_str("empty value"),
        }
    }
}

impl std::error::Error for HexParseError {}

/// Parse user-entered hex into bytes.
///
/// Accepts an optional `0x` prefix and any mix of space, colon and dash
/// separators: `"DE AD"`, `"0xdead"`, `"de:ad:be:ef"` all parse.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexParseError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let mut digits = Vec::new();
    for c in trimmed.chars() {
        match c {
            ' ' | ':' | '-' => {}
            _ => {
                let digit = c.to_digit(16).ok_or(HexParseError::InvalidDigit(c))?;
                #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
                digits.push(digit as u8);
            }
        }
    }

    if digits.is_empty() {
        return Err(HexParseError::Empty);
    }
    if digits.len() % 2 != 0 {
        return Err(HexParseError::OddLength);
    }

    Ok(digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

/// Format bytes as space-separated uppercase hex: `DE AD BE EF`.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Printable-ASCII preview of a value, with `.` for everything else.
pub fn ascii_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            }
        })
        .collect()
}

/// One-line display form: hex plus an ASCII preview when it adds anything.
pub fn display_value(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "(empty)".to_owned();
    }
    let hex = format_hex(bytes);
    let ascii = ascii_preview(bytes);
    if ascii.chars().any(|c| c != '.') {
        format!("{hex}  \"{ascii}\"")
    } else {
        hex
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_spaced_hex() {
        assert_eq!(parse_hex("DE AD BE EF").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn parses_prefixed_and_separated_forms() {
        assert_eq!(parse_hex("0xdead").unwrap(), vec![0xDE, 0xAD]);
        assert_eq!(parse_hex("de:ad:be:ef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_hex("de-ad").unwrap(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn rejects_odd_digit_count() {
        assert_eq!(parse_hex("DEA").unwrap_err(), HexParseError::OddLength);
    }

    #[test]
    fn rejects_non_hex_characters() {
        assert_eq!(parse_hex("ZZ").unwrap_err(), HexParseError::InvalidDigit('Z'));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_hex("   ").unwrap_err(), HexParseError::Empty);
        assert_eq!(parse_hex("0x").unwrap_err(), HexParseError::Empty);
    }

    #[test]
    fn formats_uppercase_spaced() {
        assert_eq!(format_hex(&[0xDE, 0xAD]), "DE AD");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn display_value_includes_ascii_when_printable() {
        assert_eq!(display_value(b"Hi"), "48 69  \"Hi\"");
        assert_eq!(display_value(&[0x00, 0x01]), "00 01");
        assert_eq!(display_value(&[]), "(empty)");
    }
}
