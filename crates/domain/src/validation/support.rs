use chrono::{Datelike, NaiveDate};

/// Default absolute tolerance below which two amounts are treated as equal.
pub const DEFAULT_AMOUNT_TOLERANCE: f64 = 1_000.0;

/// Returns whether two inclusive date ranges overlap.
///
/// Ranges touching at a single day count as overlapping.
#[must_use]
pub fn date_ranges_overlap(
    first_start: NaiveDate,
    first_end: NaiveDate,
    second_start: NaiveDate,
    second_end: NaiveDate,
) -> bool {
    first_start <= second_end && second_start <= first_end
}

/// Returns the intersection of two inclusive date ranges, if any.
#[must_use]
pub fn overlap_window(
    first_start: NaiveDate,
    first_end: NaiveDate,
    second_start: NaiveDate,
    second_end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    if !date_ranges_overlap(first_start, first_end, second_start, second_end) {
        return None;
    }
    Some((first_start.max(second_start), first_end.min(second_end)))
}

/// Returns the inclusive whole-month count between two dates.
///
/// The count is derived from calendar year/month difference, not day
/// arithmetic: January 1st through March 31st spans 3 months, and so does
/// January 31st through March 1st.
#[must_use]
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months + 1
}

/// Returns whether two amounts differ by no more than `tolerance`.
#[must_use]
pub fn amounts_match(first: f64, second: f64, tolerance: f64) -> bool {
    (first - second).abs() <= tolerance
}
