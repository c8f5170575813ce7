//! Number and label formatting for percentile tables and matrix tiles.
//!
//! Every textual rendering of engine output goes through this module so the
//! CLI and any UI collaborator print values the same way, including
//! European-style decimals (swapping `.` and `,`).

/// Swap `.` and `,` in an already formatted numeric string.
fn europeanize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a dps/hps value with K/M suffix for compact display.
///
/// - Values >= 1,000,000 are formatted as `X.XXM`
/// - Values >= 1,000 are formatted as `X.XXK`
/// - Values below 1,000 are rounded to whole numbers
///
/// # Examples
/// ```
/// use jobstat_types::formatting::format_compact;
/// assert_eq!(format_compact(500.0, false), "500");
/// assert_eq!(format_compact(15_250.0, false), "15.25K");
/// assert_eq!(format_compact(1_500.0, true), "1,50K");
/// ```
pub fn format_compact(n: f64, european: bool) -> String {
    // Thresholds sit where the smaller unit would round up into the next one
    let n_abs = n.abs();
    let s = if n_abs >= 999_995.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n_abs >= 999.5 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    };
    maybe_eu(s, european)
}

/// Format a percentile-to-percentile difference with an explicit sign.
///
/// # Examples
/// ```
/// use jobstat_types::formatting::format_signed_compact;
/// assert_eq!(format_signed_compact(300.0, false), "+300");
/// assert_eq!(format_signed_compact(-1_250.0, false), "-1.25K");
/// assert_eq!(format_signed_compact(0.0, false), "0");
/// ```
pub fn format_signed_compact(n: f64, european: bool) -> String {
    let body = format_compact(n, european);
    if n > 0.0 { format!("+{body}") } else { body }
}

/// Format a percentage value with 1 decimal place.
///
/// # Examples
/// ```
/// use jobstat_types::formatting::format_pct;
/// assert_eq!(format_pct(42.7, false), "42.7%");
/// assert_eq!(format_pct(42.7, true), "42,7%");
/// ```
pub fn format_pct(n: f64, european: bool) -> String {
    maybe_eu(format!("{:.1}%", n), european)
}

/// Format an optional value, rendering gaps as `-`.
pub fn format_optional(n: Option<f64>, european: bool) -> String {
    match n {
        Some(v) => format_compact(v, european),
        None => "-".to_string(),
    }
}

/// Format a percentile bucket as a column label (`p95`).
pub fn format_percentile(p: u32) -> String {
    format!("p{p}")
}

/// Render a `YYYYMMDD` date as `YYYY-MM-DD`.
///
/// Strings that are not exactly eight characters are returned unchanged.
///
/// # Examples
/// ```
/// use jobstat_types::formatting::format_compact_date;
/// assert_eq!(format_compact_date("20240115"), "2024-01-15");
/// assert_eq!(format_compact_date("bad"), "bad");
/// ```
pub fn format_compact_date(date: &str) -> String {
    if date.len() != 8 || !date.is_ascii() {
        return date.to_string();
    }
    format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0.0, false), "0");
        assert_eq!(format_compact(999.0, false), "999");
        assert_eq!(format_compact(1_000.0, false), "1.00K");
        assert_eq!(format_compact(15_000.0, false), "15.00K");
        assert_eq!(format_compact(1_500_000.0, false), "1.50M");
        assert_eq!(format_compact(-2_000.0, false), "-2.00K");
    }

    #[test]
    fn test_format_compact_rounds_into_next_unit() {
        assert_eq!(format_compact(999.4, false), "999");
        assert_eq!(format_compact(999.6, false), "1.00K");
        assert_eq!(format_compact(-999.6, false), "-1.00K");
        assert_eq!(format_compact(999_994.0, false), "999.99K");
        assert_eq!(format_compact(999_999.0, false), "1.00M");
    }

    #[test]
    fn test_format_compact_european() {
        assert_eq!(format_compact(500.0, true), "500");
        assert_eq!(format_compact(1_500.0, true), "1,50K");
        assert_eq!(format_compact(1_500_000.0, true), "1,50M");
    }

    #[test]
    fn test_format_signed_compact() {
        assert_eq!(format_signed_compact(300.0, false), "+300");
        assert_eq!(format_signed_compact(1_500.0, true), "+1,50K");
        assert_eq!(format_signed_compact(-40.0, false), "-40");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(300.0, false), "300.0%");
        assert_eq!(format_pct(12.34, true), "12,3%");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(None, false), "-");
        assert_eq!(format_optional(Some(2_500.0), false), "2.50K");
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(format_percentile(99), "p99");
        assert_eq!(format_compact_date("20231231"), "2023-12-31");
        assert_eq!(format_compact_date("2023123"), "2023123");
    }

    #[test]
    fn test_europeanize() {
        assert_eq!(europeanize("1.50K"), "1,50K");
        assert_eq!(europeanize("1,500.5"), "1.500,5");
    }
}
