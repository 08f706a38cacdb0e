//! Human-readable duration labels derived from a pair of calendar dates.
//!
//! The label is what the phase editor writes into the free-text duration
//! field whenever both dates are known:
//!
//! | whole days `d`   | label                           |
//! |------------------|---------------------------------|
//! | `d <= 0`         | `0 days`                        |
//! | `1..=6`          | `3 days`, `1 day`               |
//! | `7..=29`         | `2 weeks`, `1 week 2 days`      |
//! | `30..`           | `1 month`, `2 months 5 days`    |
//!
//! Months are fixed 30-day blocks, not calendar months.

use chrono::NaiveDate;
use std::fmt;

const DAYS_PER_WEEK: u32 = 7;
const DAYS_PER_MONTH: u32 = 30;

/// The day count between two dates, split into the largest unit that fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanBreakdown {
    Days(u32),
    Weeks { weeks: u32, days: u32 },
    Months { months: u32, days: u32 },
}

impl SpanBreakdown {
    /// Split a whole-day count into the display unit.
    #[must_use]
    pub const fn from_days(total: u32) -> Self {
        if total < DAYS_PER_WEEK {
            Self::Days(total)
        } else if total < DAYS_PER_MONTH {
            Self::Weeks {
                weeks: total / DAYS_PER_WEEK,
                days: total % DAYS_PER_WEEK,
            }
        } else {
            Self::Months {
                months: total / DAYS_PER_MONTH,
                days: total % DAYS_PER_MONTH,
            }
        }
    }

    /// Total whole days represented.
    #[must_use]
    pub const fn total_days(self) -> u32 {
        match self {
            Self::Days(days) => days,
            Self::Weeks { weeks, days } => weeks * DAYS_PER_WEEK + days,
            Self::Months { months, days } => months * DAYS_PER_MONTH + days,
        }
    }
}

impl fmt::Display for SpanBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (count, unit, rest) = match *self {
            Self::Days(days) => return write_unit(f, days, "day"),
            Self::Weeks { weeks, days } => (weeks, "week", days),
            Self::Months { months, days } => (months, "month", days),
        };
        write_unit(f, count, unit)?;
        if rest > 0 {
            f.write_str(" ")?;
            write_unit(f, rest, "day")?;
        }
        Ok(())
    }
}

fn write_unit(f: &mut fmt::Formatter<'_>, count: u32, unit: &str) -> fmt::Result {
    if count == 1 {
        write!(f, "{count} {unit}")
    } else {
        write!(f, "{count} {unit}s")
    }
}

/// Whole days from `start` to `end`, or `None` when `end <= start`.
#[must_use]
pub fn elapsed_days(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    if end <= start {
        return None;
    }
    u32::try_from((end - start).num_days()).ok()
}

/// Break the span between two dates into its display unit.
///
/// Equal and inverted ranges are the degenerate `Days(0)`.
#[must_use]
pub fn breakdown(start: NaiveDate, end: NaiveDate) -> SpanBreakdown {
    SpanBreakdown::from_days(elapsed_days(start, end).unwrap_or(0))
}

/// The duration label for a phase running from `start` to `end`.
#[must_use]
pub fn compute_duration(start: NaiveDate, end: NaiveDate) -> String {
    breakdown(start, end).to_string()
}

/// Like [`compute_duration`], but yields nothing until both dates are known.
#[must_use]
pub fn compute_duration_opt(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(compute_duration(start, end)),
        _ => None,
    }
}

/// The integer a free-text label starts with (`"3 weeks"` → 3), or 0.
///
/// Used to total up phase lengths across projects regardless of unit.
#[must_use]
pub fn leading_count(label: &str) -> u32 {
    let head = label.trim_start().split(' ').next().unwrap_or_default();
    let digits: String = head
        .chars()
        .enumerate()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && (c == '+' || c == '-')))
        .map(|(_, c)| c)
        .collect();
    digits
        .parse::<i64>()
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    fn plus(days: u64) -> NaiveDate {
        start().checked_add_days(Days::new(days)).expect("in range")
    }

    #[test]
    fn equal_and_inverted_ranges_are_zero_days() {
        assert_eq!(compute_duration(start(), start()), "0 days");
        assert_eq!(compute_duration(plus(5), start()), "0 days");
    }

    #[test]
    fn day_labels_pluralize() {
        assert_eq!(compute_duration(start(), plus(1)), "1 day");
        assert_eq!(compute_duration(start(), plus(2)), "2 days");
        assert_eq!(compute_duration(start(), plus(6)), "6 days");
    }

    #[test]
    fn week_labels() {
        assert_eq!(compute_duration(start(), plus(7)), "1 week");
        assert_eq!(compute_duration(start(), plus(8)), "1 week 1 day");
        assert_eq!(compute_duration(start(), plus(9)), "1 week 2 days");
        assert_eq!(compute_duration(start(), plus(14)), "2 weeks");
        assert_eq!(compute_duration(start(), plus(29)), "4 weeks 1 day");
    }

    #[test]
    fn month_labels() {
        assert_eq!(compute_duration(start(), plus(30)), "1 month");
        assert_eq!(compute_duration(start(), plus(31)), "1 month 1 day");
        assert_eq!(compute_duration(start(), plus(35)), "1 month 5 days");
        assert_eq!(compute_duration(start(), plus(60)), "2 months");
        assert_eq!(compute_duration(start(), plus(400)), "13 months 10 days");
    }

    #[test]
    fn breakdown_totals_are_lossless() {
        for days in 0..200 {
            assert_eq!(SpanBreakdown::from_days(days).total_days(), days);
        }
    }

    #[test]
    fn optional_variant_waits_for_both_dates() {
        assert_eq!(compute_duration_opt(Some(start()), None), None);
        assert_eq!(compute_duration_opt(None, Some(plus(3))), None);
        assert_eq!(
            compute_duration_opt(Some(start()), Some(plus(3))).as_deref(),
            Some("3 days")
        );
    }

    #[test]
    fn leading_count_reads_first_token() {
        assert_eq!(leading_count("3 weeks"), 3);
        assert_eq!(leading_count("12"), 12);
        assert_eq!(leading_count("1 month 5 days"), 1);
        assert_eq!(leading_count("8weeks"), 8);
        assert_eq!(leading_count("about 3 weeks"), 0);
        assert_eq!(leading_count(""), 0);
        assert_eq!(leading_count("-2 weeks"), 0);
    }
}
