//! Primitive converters between register text and values
//!
//! The register tool prints every field as a hex word (`0x0000001b`). Strings
//! are packed four ASCII characters per 32-bit word, most significant byte
//! first, NUL padded at the end.

use serde::{Deserialize, Serialize};
use sw_error::{Result, SwitchInfoError};

/// Hex digits in one 32-bit register word
pub const WORD_HEX_DIGITS: usize = 8;

/// Parse a register value as base 16, with or without a `0x` prefix.
pub fn hex_to_decimal(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SwitchInfoError::malformed_hex(raw));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(significant, 16).map_err(|_| SwitchInfoError::malformed_hex(raw))
}

/// Format a value as lowercase hex without a prefix, for index parameters.
pub fn decimal_to_hex(value: u64) -> String {
    format!("{:x}", value)
}

/// Parse one 32-bit register word.
pub fn parse_word(raw: &str) -> Result<u32> {
    let value = hex_to_decimal(raw)?;
    u32::try_from(value).map_err(|_| SwitchInfoError::malformed_hex(raw))
}

/// Decode packed ASCII spread across consecutive register words.
pub fn hex_words_to_text<S: AsRef<str>>(words: &[S]) -> Result<String> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&parse_word(word.as_ref())?.to_be_bytes());
    }

    while bytes.last() == Some(&0) {
        bytes.pop();
    }

    if let Some(bad) = bytes.iter().find(|b| !b.is_ascii()) {
        return Err(SwitchInfoError::decode(format!(
            "non-ASCII byte 0x{:02x} in packed string",
            bad
        )));
    }

    String::from_utf8(bytes).map_err(|e| SwitchInfoError::decode(e.to_string()))
}

/// Encode ASCII text as 8-digit hex words, zero padding the last word.
pub fn text_to_hex_words(text: &str) -> Result<Vec<String>> {
    if !text.is_ascii() {
        return Err(SwitchInfoError::configuration(format!(
            "'{}' contains non-ASCII characters",
            text
        )));
    }

    Ok(text
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            word.iter().map(|b| format!("{:02x}", b)).collect::<String>()
        })
        .collect())
}

/// Render the low `width` bits of `value` MSB first.
pub fn bitmask_to_binary_string(value: u64, width: u32) -> String {
    (0..width)
        .rev()
        .map(|bit| if bit < 64 && (value >> bit) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Return the hex digit at `position` (0 = most significant) of a 32-bit word.
pub fn word_nibble(raw: &str, position: usize) -> Result<u8> {
    if position >= WORD_HEX_DIGITS {
        return Err(SwitchInfoError::decode(format!("nibble {} outside a 32-bit word", position)));
    }
    let word = parse_word(raw)?;
    let shift = (WORD_HEX_DIGITS - 1 - position) * 4;
    Ok(((word >> shift) & 0xf) as u8)
}

/// How an uptime is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStyle {
    /// `HH:MM:SS`, hours keep counting past 24
    Hours,
    /// `DdHH:MM:SS`
    Days,
}

pub fn seconds_to_clock(total: u64, style: ClockStyle) -> String {
    let seconds = total % 60;
    let minutes = (total / 60) % 60;
    match style {
        ClockStyle::Hours => format!("{:02}:{:02}:{:02}", total / 3600, minutes, seconds),
        ClockStyle::Days => {
            let hours = (total / 3600) % 24;
            format!("{}d{:02}:{:02}:{:02}", total / 86_400, hours, minutes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_decimal_prefixed() {
        assert_eq!(hex_to_decimal("0x0000001b").unwrap(), 27);
        assert_eq!(hex_to_decimal("0X7D0").unwrap(), 2000);
        assert_eq!(hex_to_decimal("0x0").unwrap(), 0);
        assert_eq!(hex_to_decimal("0x00000000").unwrap(), 0);
    }

    #[test]
    fn test_hex_to_decimal_unprefixed_and_whitespace() {
        assert_eq!(hex_to_decimal("75e").unwrap(), 1886);
        assert_eq!(hex_to_decimal("  0x108 ").unwrap(), 264);
    }

    #[test]
    fn test_hex_to_decimal_rejects_garbage() {
        assert!(matches!(hex_to_decimal("0x12g4"), Err(SwitchInfoError::MalformedHex { .. })));
        assert!(matches!(hex_to_decimal("0x"), Err(SwitchInfoError::MalformedHex { .. })));
        assert!(matches!(hex_to_decimal(""), Err(SwitchInfoError::MalformedHex { .. })));
        assert!(matches!(hex_to_decimal("N/A"), Err(SwitchInfoError::MalformedHex { .. })));
    }

    #[test]
    fn test_hex_to_decimal_overflow() {
        assert!(hex_to_decimal("0x1ffffffffffffffff").is_err());
        assert_eq!(hex_to_decimal("0x000ffffffffffffffff").unwrap(), u64::MAX);
    }

    #[test]
    fn test_decimal_to_hex_inverse() {
        for n in [0u64, 1, 9, 10, 15, 16, 64, 255, 4096, 0xdead_beef, u32::MAX as u64, u64::MAX] {
            assert_eq!(hex_to_decimal(&decimal_to_hex(n)).unwrap(), n);
            assert_eq!(hex_to_decimal(&format!("0x{}", decimal_to_hex(n))).unwrap(), n);
        }
        assert_eq!(decimal_to_hex(64), "40");
        assert_eq!(decimal_to_hex(0), "0");
    }

    #[test]
    fn test_hex_words_to_text() {
        let words = ["0x4d543132", "0x33345835", "0x36373839", "0x00000000"];
        assert_eq!(hex_words_to_text(&words).unwrap(), "MT1234X56789");
    }

    #[test]
    fn test_hex_words_to_text_keeps_spaces_and_punctuation() {
        // "SN-2 A.b" split across two words
        let words = ["0x534e2d32", "0x20412e62"];
        assert_eq!(hex_words_to_text(&words).unwrap(), "SN-2 A.b");
    }

    #[test]
    fn test_hex_words_to_text_short_words_are_left_padded() {
        // 0x41 is the word 0x00000041: three leading NULs, then 'A'
        assert_eq!(hex_words_to_text(&["0x41"]).unwrap(), "\0\0\0A");
    }

    #[test]
    fn test_hex_words_to_text_rejects_non_ascii() {
        assert!(matches!(hex_words_to_text(&["0xff000000"]), Err(SwitchInfoError::Decode(_))));
    }

    #[test]
    fn test_hex_words_to_text_empty() {
        let words: [&str; 0] = [];
        assert_eq!(hex_words_to_text(&words).unwrap(), "");
        assert_eq!(hex_words_to_text(&["0x0", "0x0"]).unwrap(), "");
    }

    #[test]
    fn test_text_to_hex_words_pads_last_word() {
        assert_eq!(text_to_hex_words("rack-12").unwrap(), vec!["7261636b", "2d313200"]);
        assert_eq!(text_to_hex_words("abcd").unwrap(), vec!["61626364"]);
        assert!(text_to_hex_words("").unwrap().is_empty());
    }

    #[test]
    fn test_text_to_hex_words_rejects_non_ascii() {
        assert!(matches!(text_to_hex_words("räck"), Err(SwitchInfoError::Configuration(_))));
    }

    #[test]
    fn test_text_round_trip() {
        let samples = [
            "",
            "a",
            "rack-12",
            "spine switch 03 / row B",
            "0123456789012345678901234567890123456789012345678901234567890123",
        ];
        for s in samples {
            let words = text_to_hex_words(s).unwrap();
            assert!(words.len() * 4 >= s.len());
            assert_eq!(hex_words_to_text(&words).unwrap(), s);
        }
    }

    #[test]
    fn test_words_round_trip_up_to_padding() {
        let words = ["0x6c656166", "0x2d310000"];
        let text = hex_words_to_text(&words).unwrap();
        assert_eq!(text, "leaf-1");
        assert_eq!(text_to_hex_words(&text).unwrap(), vec!["6c656166", "2d310000"]);
    }

    #[test]
    fn test_bitmask_to_binary_string() {
        assert_eq!(bitmask_to_binary_string(0b1101_0010, 8), "11010010");
        assert_eq!(bitmask_to_binary_string(0b101, 6), "000101");
        assert_eq!(bitmask_to_binary_string(0xff, 4), "1111");
        assert_eq!(bitmask_to_binary_string(0, 0), "");
    }

    #[test]
    fn test_word_nibble() {
        assert_eq!(word_nibble("0x50000001", 0).unwrap(), 5);
        assert_eq!(word_nibble("0x50000001", 7).unwrap(), 1);
        assert_eq!(word_nibble("0x2", 7).unwrap(), 2);
        assert_eq!(word_nibble("0x2", 0).unwrap(), 0);
        assert!(word_nibble("0x2", 8).is_err());
    }

    #[test]
    fn test_seconds_to_clock_hours() {
        assert_eq!(seconds_to_clock(0, ClockStyle::Hours), "00:00:00");
        assert_eq!(seconds_to_clock(3_661, ClockStyle::Hours), "01:01:01");
        assert_eq!(seconds_to_clock(273_906, ClockStyle::Hours), "76:05:06");
    }

    #[test]
    fn test_seconds_to_clock_days() {
        assert_eq!(seconds_to_clock(59, ClockStyle::Days), "0d00:00:59");
        assert_eq!(seconds_to_clock(273_906, ClockStyle::Days), "3d04:05:06");
    }
}
