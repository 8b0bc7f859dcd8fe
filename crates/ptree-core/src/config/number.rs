//! Numeric command-line values.
//!
//! Values follow C `strtol(s, 0)` conventions: optional leading whitespace
//! and sign, `0x` for hexadecimal, a leading `0` for octal, otherwise
//! decimal. The whole string must be consumed.

use ptree_common::{Error, ProcessId};

/// Outcome of reading a pid-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidValue {
    Valid(ProcessId),
    /// Not a number at all.
    Invalid,
    TooSmall,
    TooLarge,
}

/// Classify `text` as a pid in `0..=i32::MAX`.
pub fn classify_pid(text: &str) -> PidValue {
    match parse_c_long(text) {
        None => PidValue::Invalid,
        Some(value) if value < 0 => PidValue::TooSmall,
        Some(value) if value > i128::from(i32::MAX) => PidValue::TooLarge,
        // Range checked above.
        Some(value) => PidValue::Valid(ProcessId(value as u32)),
    }
}

/// Parse a pid, turning every problem into a configuration error.
pub fn parse_pid(text: &str) -> Result<ProcessId, Error> {
    match classify_pid(text) {
        PidValue::Valid(pid) => Ok(pid),
        PidValue::Invalid => Err(Error::InvalidNumber(text.to_string())),
        PidValue::TooSmall => Err(Error::NumberTooSmall(text.to_string())),
        PidValue::TooLarge => Err(Error::NumberTooLarge(text.to_string())),
    }
}

/// `clap` value parser wrapper around [`parse_pid`].
pub fn pid_arg(text: &str) -> Result<ProcessId, String> {
    parse_pid(text).map_err(|e| e.to_string())
}

/// Parse like `strtol` with base 0, saturating far outside the `long` range.
fn parse_c_long(text: &str) -> Option<i128> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = if let Some(hex) = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
    {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let mut value: i128 = 0;
    for c in digits.chars() {
        let digit = i128::from(c.to_digit(radix)?);
        // Anything this large is out of range already; stop growing.
        value = (value * i128::from(radix) + digit).min(i128::from(u64::MAX));
    }

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_hex_octal() {
        assert_eq!(classify_pid("42"), PidValue::Valid(ProcessId(42)));
        assert_eq!(classify_pid("0x1f"), PidValue::Valid(ProcessId(31)));
        assert_eq!(classify_pid("010"), PidValue::Valid(ProcessId(8)));
        assert_eq!(classify_pid("0"), PidValue::Valid(ProcessId(0)));
        assert_eq!(classify_pid("  7"), PidValue::Valid(ProcessId(7)));
        assert_eq!(classify_pid("+7"), PidValue::Valid(ProcessId(7)));
    }

    #[test]
    fn test_non_numbers_are_invalid() {
        assert_eq!(classify_pid("root"), PidValue::Invalid);
        assert_eq!(classify_pid(""), PidValue::Invalid);
        assert_eq!(classify_pid("12abc"), PidValue::Invalid);
        assert_eq!(classify_pid("0x"), PidValue::Invalid);
        assert_eq!(classify_pid("09"), PidValue::Invalid);
        assert_eq!(classify_pid("-"), PidValue::Invalid);
    }

    #[test]
    fn test_range_limits() {
        assert_eq!(classify_pid("-1"), PidValue::TooSmall);
        assert_eq!(classify_pid("2147483647"), PidValue::Valid(ProcessId(2147483647)));
        assert_eq!(classify_pid("2147483648"), PidValue::TooLarge);
        assert_eq!(classify_pid("99999999999999999999999999"), PidValue::TooLarge);
        assert_eq!(classify_pid("-99999999999999999999999999"), PidValue::TooSmall);
    }

    #[test]
    fn test_parse_pid_error_messages() {
        assert_eq!(
            parse_pid("abc").unwrap_err().to_string(),
            "Number is invalid: \"abc\""
        );
        assert_eq!(
            pid_arg("-3").unwrap_err(),
            "Number is too small: \"-3\""
        );
    }
}
