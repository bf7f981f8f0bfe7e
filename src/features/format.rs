//! Number formatting for KPI cards and tables, en-US style.

/// Two decimals with thousands separators: `1234.5` -> `1,234.50`.
#[must_use]
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// One decimal with a `K`/`M` suffix from a thousand upwards: `1500` -> `1.5K`.
#[must_use]
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        trim_number(value)
    }
}

/// Shortest plain rendering: `12.0` -> `12`, `12.5` -> `12.5`.
#[must_use]
pub fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_with_two_decimals() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(12.0), "12.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-1500.0), "-1,500.00");
        assert_eq!(format_amount(f64::NAN), "0.00");
    }

    #[test]
    fn compact_numbers_use_suffixes() {
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(1500.0), "1.5K");
        assert_eq!(format_compact(2_300_000.0), "2.3M");
        assert_eq!(format_compact(12.25), "12.25");
    }
}
