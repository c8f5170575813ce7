//! Contiguous daily calendars for gap-filling.
//!
//! Dates are naive calendar days, so there is no timezone or DST shift
//! between parsing and formatting.

use chrono::{Datelike, NaiveDate};
use jobstat_types::CompactDate;

const COMPACT_FORMAT: &str = "%Y%m%d";

pub fn to_naive(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), COMPACT_FORMAT).ok()
}

pub fn from_naive(date: NaiveDate) -> CompactDate {
    CompactDate::from_ymd(date.year(), date.month(), date.day())
}

/// Every calendar day from the earliest to the latest observed date,
/// inclusive and ascending. Unparsable dates are ignored.
pub fn build_full_range<I, S>(observed: I) -> Vec<CompactDate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for date in observed {
        let Some(day) = to_naive(date.as_ref()) else {
            continue;
        };
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(day), hi.max(day)),
            None => (day, day),
        });
    }

    let Some((first, last)) = bounds else {
        return Vec::new();
    };
    first.iter_days().take_while(|d| *d <= last).map(from_naive).collect()
}
