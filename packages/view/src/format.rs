//! Human-facing formatting for the detail payload.
//!
//! Absent values print as [`NO_DATA_TEXT`], never as `0`.

use vaxmap_view_models::NO_DATA_TEXT;

/// Formats a population with thousands separators.
#[must_use]
pub fn population(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA_TEXT.to_string(), |v| group_thousands(v.round()))
}

/// Formats an incident rate per 100k.
#[must_use]
pub fn incidents(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA_TEXT.to_string(), |v| format!("{v:.2} per 100k"))
}

/// Formats a coverage percentage.
#[must_use]
pub fn coverage(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA_TEXT.to_string(), |v| format!("{v:.1}%"))
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_groups_thousands() {
        assert_eq!(population(Some(38_041_754.0)), "38,041,754");
        assert_eq!(population(Some(999.0)), "999");
        assert_eq!(population(Some(1000.0)), "1,000");
        assert_eq!(population(Some(0.0)), "0");
    }

    #[test]
    fn rates_and_percentages() {
        assert_eq!(incidents(Some(1.234)), "1.23 per 100k");
        assert_eq!(coverage(Some(85.0)), "85.0%");
    }

    #[test]
    fn absent_values_are_not_zero() {
        assert_eq!(population(None), NO_DATA_TEXT);
        assert_eq!(incidents(None), NO_DATA_TEXT);
        assert_eq!(coverage(None), NO_DATA_TEXT);
        assert_ne!(incidents(Some(0.0)), NO_DATA_TEXT);
    }
}
