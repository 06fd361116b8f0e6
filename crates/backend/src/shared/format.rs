/// Форматирует число с разделителями тысяч (точками): 1234567 -> "1.234.567"
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string(), '.')
}

/// Compact money value for KPI cards.
///
/// `format_big_number(1_250_000.0, "R$")` gives `"R$ 1.25 Mi"`; the suffixes are
/// K (thousands), Mi (millions) and Bi (billions).
pub fn format_big_number(value: f64, prefix: &str) -> String {
    let abs = value.abs();
    let body = if abs >= 1_000_000_000.0 {
        format!("{:.2} Bi", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2} Mi", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2} K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    };
    with_prefix(prefix, &body)
}

/// Money with comma thousands separators and two decimals: "R$ 1,234.50"
pub fn format_money(value: f64, prefix: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let body = format!("{}{}.{}", sign, group_thousands(int_part, ','), frac_part);
    with_prefix(prefix, &body)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn with_prefix(prefix: &str, body: &str) -> String {
    if prefix.is_empty() {
        body.to_string()
    } else {
        format!("{} {}", prefix, body)
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(separator);
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn test_format_big_number() {
        assert_eq!(format_big_number(0.0, "R$"), "R$ 0.00");
        assert_eq!(format_big_number(999.994, "R$"), "R$ 999.99");
        assert_eq!(format_big_number(1_500.0, "R$"), "R$ 1.50 K");
        assert_eq!(format_big_number(1_250_000.0, "R$"), "R$ 1.25 Mi");
        assert_eq!(format_big_number(16_008_872.12, "R$"), "R$ 16.01 Mi");
        assert_eq!(format_big_number(2_000_000_000.0, "R$"), "R$ 2.00 Bi");
        assert_eq!(format_big_number(350.0, ""), "350.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(175.0, "R$"), "R$ 175.00");
        assert_eq!(format_money(1234.5, "R$"), "R$ 1,234.50");
        assert_eq!(format_money(1234567.891, ""), "1,234,567.89");
        assert_eq!(format_money(-1000.0, ""), "-1,000.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(62.5), "62.5%");
        assert_eq!(format_percent(100.0), "100.0%");
    }
}
