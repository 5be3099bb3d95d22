//! Console number formatting for the loader and report binaries
//!
//! Counts are printed with thousands separators (`541,909`) and money with
//! two decimals and a dollar sign (`$9,747,747.93`).

/// Format an integer count with `,` thousands separators
///
/// # Examples
///
/// ```
/// use ora_common::format::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(541_909), "541,909");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a signed amount as dollars with two decimals
///
/// # Examples
///
/// ```
/// use ora_common::format::format_money;
///
/// assert_eq!(format_money(9_747_747.934), "$9,747,747.93");
/// assert_eq!(format_money(-12.5), "-$12.50");
/// ```
pub fn format_money(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), frac)
}

/// Documents per second, guarded against a zero elapsed time
pub fn rate_per_sec(count: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        count as f64 / elapsed_secs
    } else {
        0.0
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_boundaries() {
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(100_000), "100,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_money_rounding() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(0.005), "$0.01");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(-0.001), "$0.00");
    }

    #[test]
    fn test_rate_per_sec_zero_elapsed() {
        assert_eq!(rate_per_sec(100, 0.0), 0.0);
        assert_eq!(rate_per_sec(100, 2.0), 50.0);
    }
}
