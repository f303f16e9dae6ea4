//! Display formatting for dates, scores, counts and money.
//!
//! Every function here is total: absent, empty or odd inputs map to a fixed
//! placeholder instead of an error.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::notify::ToastKind;

/// Shown in place of a missing value
pub const PLACEHOLDER: &str = "N/A";

/// Shown for a timestamp that cannot be parsed
pub const INVALID_DATE: &str = "Invalid Date";

/// Appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Format a backend timestamp in local time, e.g. `Mar 5, 2024, 02:07 PM`.
pub fn format_date(input: Option<&str>) -> String {
    format_date_in(input, &Local)
}

/// Format a backend timestamp in the given time zone.
///
/// Accepts RFC 3339 (`2024-03-05T14:07:00Z`), a naive date-time read as wall
/// time in `tz`, or a bare date read as UTC midnight.
pub fn format_date_in<Tz>(input: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER.to_string();
    };

    match parse_timestamp(input, tz) {
        Some(datetime) => datetime.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_timestamp<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Some(datetime.with_timezone(tz));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
            return tz.from_local_datetime(&naive).earliest();
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(tz))
}

/// Format a confidence score in `[0, 1]` as `80% (High)`.
///
/// Tiers are inclusive on their lower bound: 80 and up is High, 60 and up is
/// Medium, anything else Low.
pub fn format_confidence(score: Option<f64>) -> String {
    let Some(score) = score.filter(|s| !s.is_nan()) else {
        return PLACEHOLDER.to_string();
    };

    let percentage = round_half_up(score * 100.0) as i64;
    let label = if percentage >= 80 {
        "High"
    } else if percentage >= 60 {
        "Medium"
    } else {
        "Low"
    };

    format!("{}% ({})", percentage, label)
}

/// Alert kind matching a confidence score
pub fn confidence_tone(score: f64) -> ToastKind {
    if score >= 0.8 {
        ToastKind::Success
    } else if score >= 0.6 {
        ToastKind::Warning
    } else {
        ToastKind::Error
    }
}

/// Abbreviate large counts: `1.5M`, `12.3K`, `999`.
pub fn format_number(num: f64) -> String {
    if num >= 1_000_000.0 {
        format!("{}M", to_fixed(num / 1_000_000.0, 1))
    } else if num >= 1_000.0 {
        format!("{}K", to_fixed(num / 1_000.0, 1))
    } else {
        num.to_string()
    }
}

/// Format an amount as US dollars, e.g. `$1,234.50` or `-$0.25`.
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return "$NaN".to_string();
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    if amount.is_infinite() {
        return format!("{}$∞", sign);
    }

    let fixed = round_shortest(amount, 2);
    let (whole, cents) = match fixed.split_once('.') {
        Some((whole, cents)) => (whole, cents),
        None => (fixed.as_str(), "00"),
    };

    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// `value / total` as a whole percentage; a zero total yields 0.
pub fn percentage(value: f64, total: f64) -> i64 {
    if total == 0.0 {
        return 0;
    }
    round_half_up(value / total * 100.0) as i64
}

/// Cut `text` to `max_len` characters and append `...` when it is longer.
pub fn truncate(text: &str, max_len: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_len) {
        None => Cow::Borrowed(text),
        Some((byte_idx, _)) => Cow::Owned(format!("{}{}", &text[..byte_idx], ELLIPSIS)),
    }
}

/// Mask a secret for display, keeping just enough to recognise it.
///
/// Keys shorter than 8 characters are fully hidden; up to 14 characters show
/// the first half; longer keys show the first 10 and last 4.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();

    if len < 8 {
        return "***".to_string();
    }
    if len <= 14 {
        let head: String = chars[..len / 2].iter().collect();
        return format!("{}***", head);
    }

    let head: String = chars[..10].iter().collect();
    let tail: String = chars[len - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

// Math.round semantics: halves go toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Fixed-point formatting of the exact binary value; exact ties take the
/// larger magnitude.
fn to_fixed(value: f64, digits: usize) -> String {
    // A tie at `digits` places is an odd multiple of 2^-(digits + 1).
    let doubled = value.abs() * 2f64.powi(digits as i32 + 1);
    if doubled.fract() != 0.0 || doubled % 2.0 != 1.0 || doubled >= 2f64.powi(53) {
        return format!("{:.*}", digits, value);
    }

    let scaled = (doubled as u128 * 5u128.pow(digits as u32)).div_ceil(2);
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, insert_point(scaled.to_string().into_bytes(), digits))
}

/// Round the shortest decimal form of `value` (what `Display` prints) to
/// `digits` places, ties away from zero. The sign is dropped.
fn round_shortest(value: f64, digits: usize) -> String {
    let repr = value.abs().to_string();
    let (whole, frac) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut kept: Vec<u8> = whole
        .bytes()
        .chain(frac.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .collect();

    if frac.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in kept.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    insert_point(kept, digits)
}

fn insert_point(mut digits_only: Vec<u8>, digits: usize) -> String {
    while digits_only.len() <= digits {
        digits_only.insert(0, b'0');
    }
    if digits > 0 {
        let at = digits_only.len() - digits;
        digits_only.insert(at, b'.');
    }
    String::from_utf8(digits_only).unwrap_or_default()
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_placeholder() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("")), "N/A");
        assert_eq!(format_date(Some("   ")), "N/A");
    }

    #[test]
    fn test_format_date_rfc3339() {
        assert_eq!(
            format_date_in(Some("2024-03-05T14:07:00Z"), &Utc),
            "Mar 5, 2024, 02:07 PM"
        );
        assert_eq!(
            format_date_in(Some("2024-03-05T09:30:00+02:00"), &Utc),
            "Mar 5, 2024, 07:30 AM"
        );
    }

    #[test]
    fn test_format_date_naive_and_date_only() {
        assert_eq!(
            format_date_in(Some("2023-11-20T23:59:59.123456"), &Utc),
            "Nov 20, 2023, 11:59 PM"
        );
        assert_eq!(
            format_date_in(Some("2023-11-20 08:05:00"), &Utc),
            "Nov 20, 2023, 08:05 AM"
        );
        assert_eq!(
            format_date_in(Some("2023-01-02"), &Utc),
            "Jan 2, 2023, 12:00 AM"
        );
    }

    #[test]
    fn test_format_date_invalid() {
        assert_eq!(format_date_in(Some("yesterday"), &Utc), "Invalid Date");
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(Some(0.8)), "80% (High)");
        assert_eq!(format_confidence(Some(0.59)), "59% (Low)");
        assert_eq!(format_confidence(Some(0.6)), "60% (Medium)");
        assert_eq!(format_confidence(Some(1.0)), "100% (High)");
        assert_eq!(format_confidence(Some(0.0)), "0% (Low)");
        assert_eq!(format_confidence(None), "N/A");
        assert_eq!(format_confidence(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_confidence_rounds_into_tier() {
        assert_eq!(format_confidence(Some(0.796)), "80% (High)");
        assert_eq!(format_confidence(Some(0.794)), "79% (Medium)");
    }

    #[test]
    fn test_confidence_tone() {
        assert_eq!(confidence_tone(0.8), ToastKind::Success);
        assert_eq!(confidence_tone(0.65), ToastKind::Warning);
        assert_eq!(confidence_tone(0.2), ToastKind::Error);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1_500_000.0), "1.5M");
        assert_eq!(format_number(1_000_000.0), "1.0M");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_000.0), "1.0K");
        assert_eq!(format_number(12_345.0), "12.3K");
        assert_eq!(format_number(1_250.0), "1.3K");
        assert_eq!(format_number(1_150.0), "1.1K");
        assert_eq!(format_number(1_450.0), "1.4K");
        assert_eq!(format_number(1_550.0), "1.6K");
        assert_eq!(format_number(2_350.0), "2.4K");
        assert_eq!(format_number(2_500_000.0), "2.5M");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(3.5), "$3.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-0.25), "-$0.25");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1.005), "$1.01");
        assert_eq!(format_currency(-2.675), "-$2.68");
        assert_eq!(format_currency(0.004), "$0.00");
    }

    #[test]
    fn test_round_half_up_matches_math_round() {
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn test_to_fixed_uses_exact_value() {
        assert_eq!(to_fixed(1.25, 1), "1.3");
        assert_eq!(to_fixed(-1.25, 1), "-1.3");
        assert_eq!(to_fixed(1.15, 1), "1.1");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(3.0, 1), "3.0");
    }

    #[test]
    fn test_round_shortest() {
        assert_eq!(round_shortest(1.005, 2), "1.01");
        assert_eq!(round_shortest(9.995, 2), "10.00");
        assert_eq!(round_shortest(12.0, 2), "12.00");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(5.0, 0.0), 0);
        assert_eq!(percentage(1.0, 3.0), 33);
        assert_eq!(percentage(2.0, 3.0), 67);
        assert_eq!(percentage(1.0, 8.0), 13);
        assert_eq!(percentage(10.0, 10.0), 100);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 7), "this is...");
        assert_eq!(truncate("", 3), "");
        assert!(matches!(truncate("keep", 4), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("größenordnung", 4), "größ...");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "***");
        assert_eq!(mask_key("abcdefgh"), "abcd***");
        assert_eq!(mask_key("sk-proj-abc123xyz789"), "sk-proj-ab...z789");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
