//! Month gridlines for the time axis.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::TimeAxis;

/// One calendar month's slice of the axis, clipped to the axis bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthLabel {
    /// e.g. `"Jan 2024"`.
    pub label: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub days: i64,
    pub position_percent: f64,
    pub width_percent: f64,
}

impl MonthLabel {
    #[must_use]
    pub fn end_percent(&self) -> f64 {
        self.position_percent + self.width_percent
    }
}

/// Walk calendar months from the month containing `axis.min_date` until the
/// month start passes `axis.max_date`.
///
/// The first and last labels are clipped to the axis, so consecutive labels
/// share edges and their widths sum to 100.
pub(super) fn month_labels(axis: &TimeAxis) -> Vec<MonthLabel> {
    let mut labels = Vec::new();
    let Some(mut month_start) = axis.min_date.with_day(1) else {
        return labels;
    };

    while month_start <= axis.max_date {
        // No next month at the top of the calendar; the axis end closes it.
        let next_month = month_start.checked_add_months(Months::new(1));
        let month_end = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(axis.max_date);

        let first_day = month_start.max(axis.min_date);
        let last_day = month_end.min(axis.max_date);
        let start_offset = axis.offset_of(first_day);
        let days = axis.offset_of(last_day) - start_offset + 1;

        labels.push(MonthLabel {
            label: month_start.format("%b %Y").to_string(),
            first_day,
            last_day,
            days,
            position_percent: axis.percent_of(start_offset),
            width_percent: axis.percent_of(days),
        });

        match next_month {
            Some(next) => month_start = next,
            None => break,
        }
    }

    labels
}
