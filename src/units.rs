//! Unit Conversion
//!
//! 72 points per inch, 25.4 millimeters per inch, 96 CSS pixels per inch.

use tracing::warn;

pub const MM_TO_PT_RATIO: f64 = 72.0 / 25.4;
pub const PT_TO_MM_RATIO: f64 = 25.4 / 72.0;
pub const PT_TO_PX_RATIO: f64 = 96.0 / 72.0;

pub fn mm2pt(mm: f64) -> f64 {
    mm * MM_TO_PT_RATIO
}

/// Converts a textual millimeter value such as `"12.5mm"`.
///
/// Only the leading numeric prefix is read. Text without one converts to NaN,
/// which is logged and returned rather than rejected.
pub fn mm2pt_lenient(text: &str) -> f64 {
    let mm = parse_float(text);
    if mm.is_nan() {
        warn!(input = text, "non-numeric millimeter value converts to NaN");
    }
    mm2pt(mm)
}

pub fn pt2mm(pt: f64) -> f64 {
    pt * PT_TO_MM_RATIO
}

pub fn pt2px(pt: f64) -> f64 {
    pt * PT_TO_PX_RATIO
}

/// Parses the longest numeric prefix of `text` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, an optional
/// exponent and the literal `Infinity`. Returns NaN when no prefix parses.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
