//! Price normalization and display formatting
//!
//! Catalog prices arrive as currency strings ("₹ 4,72,950.00"), plain
//! numbers, or free text ("Call for price"). Normalization strips the
//! currency glyph and separators and parses; failure to parse is an
//! expected outcome, not an error.

use crate::reader::CellValue;

const CURRENCY_GLYPH: char = '₹';
const THOUSANDS_SEPARATOR: char = ',';

/// Clean a raw price cell to a numeric value
///
/// Numbers pass through unchanged. Text is stripped of the currency glyph
/// and every thousands separator, trimmed, then parsed; `None` on parse
/// failure. Other values yield `None`.
pub fn clean_price(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != CURRENCY_GLYPH && *c != THOUSANDS_SEPARATOR)
                .collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Canonical display string for a price cell
///
/// A cleaned value becomes the currency glyph plus the integer-truncated
/// amount with thousands separators. Fractional units are dropped: the
/// catalog's pricing convention has no sub-unit display. When cleaning
/// fails the original raw value is shown unchanged.
pub fn format_price(value: &CellValue) -> String {
    match clean_price(value) {
        Some(v) => format!("{} {}", CURRENCY_GLYPH, group_thousands(v as i64)),
        None => value.as_display(),
    }
}

/// Format an integer with western thousands grouping
fn group_thousands(n: i64) -> String {
    let negative = n < 0;
    let digits = n.unsigned_abs().to_string();
    let bytes = digits.as_bytes();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(*b as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_currency_string() {
        // Indian digit grouping in the source, western in the output
        let value = CellValue::Text("₹ 4,72,950.00".to_string());
        assert_eq!(clean_price(&value), Some(472950.0));
        assert_eq!(format_price(&value), "₹ 472,950");
    }

    #[test]
    fn test_clean_plain_number() {
        let value = CellValue::Number(1500.0);
        assert_eq!(clean_price(&value), Some(1500.0));
        assert_eq!(format_price(&value), "₹ 1,500");
    }

    #[test]
    fn test_non_numeric_text_passes_through() {
        let value = CellValue::Text("Call for price".to_string());
        assert_eq!(clean_price(&value), None);
        assert_eq!(format_price(&value), "Call for price");
    }

    #[test]
    fn test_empty_cell() {
        assert_eq!(clean_price(&CellValue::Empty), None);
        assert_eq!(format_price(&CellValue::Empty), "");
    }

    #[test]
    fn test_fraction_is_truncated() {
        let value = CellValue::Text("₹ 100.75".to_string());
        assert_eq!(clean_price(&value), Some(100.75));
        assert_eq!(format_price(&value), "₹ 100");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(472950), "472,950");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-1234), "-1,234");
    }
}
