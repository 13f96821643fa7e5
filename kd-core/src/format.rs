//! Turkish-locale display formatting and phone-number handling.
//!
//! Numbers use `.` as the thousands separator and `,` as the decimal
//! separator, matching how amounts are printed across the tools.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;

static PHONE_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-()]").unwrap());
static MOBILE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\+90|0)?5[0-9]{9}$").unwrap());

/// Rounds to `decimals` places, half away from zero.
pub fn round_to(
    value: Decimal,
    decimals: u32,
) -> Decimal {
    round_half_up(value, decimals)
}

/// Formats a number with Turkish grouping and exactly `decimals` fraction
/// digits.
///
/// ```
/// use rust_decimal_macros::dec;
/// use kd_core::format::format_number;
///
/// assert_eq!(format_number(dec!(1234567.891), 2), "1.234.567,89");
/// assert_eq!(format_number(dec!(999), 0), "999");
/// ```
pub fn format_number(
    value: Decimal,
    decimals: u32,
) -> String {
    let rounded = round_half_up(value, decimals);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + integer.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push(',');
        out.push_str(fraction);
    }
    out
}

/// Formats a Turkish lira amount without fraction digits, e.g. `₺39.000.000`.
pub fn format_currency(value: Decimal) -> String {
    let number = format_number(value, 0);
    match number.strip_prefix('-') {
        Some(positive) => format!("-₺{positive}"),
        None => format!("₺{number}"),
    }
}

/// Formats a percentage the Turkish way, with the sign in front: `%12,5`.
pub fn format_percentage(
    value: Decimal,
    decimals: u32,
) -> String {
    format!("%{}", format_number(value, decimals))
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

fn strip_phone_noise(phone: &str) -> String {
    PHONE_NOISE.replace_all(phone, "").into_owned()
}

/// Accepts Turkish mobile numbers: `5` and nine ASCII digits, with an optional `0` or
/// `+90` prefix. Spaces, dashes and parentheses are ignored.
pub fn validate_phone_number(phone: &str) -> bool {
    MOBILE_NUMBER.is_match(&strip_phone_noise(phone))
}

/// Normalises a phone number into `0XXX XXX XX XX` or `+90 XXX XXX XX XX`.
///
/// Numbers without a prefix get a leading `0`.
///
/// ```
/// use kd_core::format::format_phone_number;
///
/// assert_eq!(format_phone_number("05321234567"), "0532 123 45 67");
/// assert_eq!(format_phone_number("+90 (532) 123-45-67"), "+90 532 123 45 67");
/// assert_eq!(format_phone_number("5321234567"), "0532 123 45 67");
/// ```
pub fn format_phone_number(phone: &str) -> String {
    let cleaned = strip_phone_noise(phone);

    if let Some(rest) = cleaned.strip_prefix("+90") {
        format!("+90 {}", split_groups(rest, &[3, 3, 2]))
    } else if cleaned.starts_with('0') {
        split_groups(&cleaned, &[4, 3, 2])
    } else {
        format!("0{}", split_groups(&cleaned, &[3, 3, 2]))
    }
}

/// Splits `s` into space-separated chunks of the given widths followed by
/// whatever remains.
fn split_groups(
    s: &str,
    widths: &[usize],
) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut parts = Vec::with_capacity(widths.len() + 1);
    let mut start = 0;
    for width in widths {
        let end = (start + width).min(chars.len());
        parts.push(chars[start..end].iter().collect::<String>());
        start = end;
    }
    parts.push(chars[start..].iter().collect::<String>());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(dec!(39000000), 0), "39.000.000");
        assert_eq!(format_number(dec!(100000), 0), "100.000");
    }

    #[test]
    fn format_number_rounds_and_pads_fraction() {
        assert_eq!(format_number(dec!(12.345), 2), "12,35");
        assert_eq!(format_number(dec!(7), 1), "7,0");
    }

    #[test]
    fn format_number_keeps_sign() {
        assert_eq!(format_number(dec!(-1234.5), 0), "-1.235");
    }

    #[test]
    fn format_number_drops_sign_of_negative_zero() {
        assert_eq!(format_number(dec!(-0.001), 0), "0");
    }

    #[test]
    fn format_currency_prefixes_lira_sign() {
        assert_eq!(format_currency(dec!(35100000)), "₺35.100.000");
        assert_eq!(format_currency(dec!(-2500)), "-₺2.500");
    }

    #[test]
    fn format_percentage_defaults_to_given_places() {
        assert_eq!(format_percentage(dec!(33.3333), 1), "%33,3");
    }

    #[test]
    fn phone_validation_accepts_supported_prefixes() {
        assert!(validate_phone_number("0532 123 45 67"));
        assert!(validate_phone_number("+905321234567"));
        assert!(validate_phone_number("(532) 123-4567"));
    }

    #[test]
    fn phone_validation_rejects_landlines_and_short_numbers() {
        assert!(!validate_phone_number("0312 123 45 67"));
        assert!(!validate_phone_number("0532 123 45"));
        assert!(!validate_phone_number("+1 532 123 45 67"));
    }

    #[test]
    fn phone_validation_rejects_non_ascii_digits() {
        assert!(!validate_phone_number("٠٥٣٢١٢٣٤٥٦٧"));
        assert!(!validate_phone_number("0５32 123 45 67"));
    }

    #[test]
    fn format_phone_handles_all_prefixes() {
        assert_eq!(format_phone_number("0532-123-45-67"), "0532 123 45 67");
        assert_eq!(format_phone_number("+905321234567"), "+90 532 123 45 67");
        assert_eq!(format_phone_number("532 123 45 67"), "0532 123 45 67");
    }
}
