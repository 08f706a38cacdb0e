//! Gantt layout: a shared time axis, one bar per dated phase, and month
//! gridlines, all expressed as percentages of the axis width.
//!
//! # Layout rules
//!
//! - Only phases with both a start and an end date take part. Their relative
//!   order is kept.
//! - The axis runs from the earliest to the latest date found on any of those
//!   phases (start *or* end) and is `max - min + 1` days long.
//! - A bar starts `start - min` days into the axis and is
//!   `end - start + 1` days wide. A phase whose end precedes its start is
//!   drawn as a single day.
//! - Bar colours cycle through [`PALETTE`] by position among the dated
//!   phases, so colours move when phases are reordered or gain/lose dates.
//!
//! The result is recomputed from scratch on each call and depends on nothing
//! but the input.

mod months;
mod palette;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::model::Phase;

pub use months::MonthLabel;
pub use palette::{PALETTE, PaletteColor};

/// The inclusive day range covered by all dated phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeAxis {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub total_days: i64,
}

impl TimeAxis {
    /// Axis covering `min..=max`. Callers pass `min <= max`.
    #[must_use]
    pub fn spanning(min_date: NaiveDate, max_date: NaiveDate) -> Self {
        Self {
            min_date,
            max_date,
            total_days: (max_date - min_date).num_days() + 1,
        }
    }

    /// Whole days from the axis start to `date`.
    #[must_use]
    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        (date - self.min_date).num_days()
    }

    /// `days` as a percentage of the axis length.
    #[must_use]
    pub fn percent_of(&self, days: i64) -> f64 {
        100.0 * days as f64 / self.total_days as f64
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.min_date..=self.max_date).contains(&date)
    }
}

/// One phase positioned on the axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseBar {
    /// Index of the phase in the sequence passed to [`layout`].
    pub phase_index: usize,
    pub name: String,
    pub duration_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_offset_days: i64,
    pub duration_days: i64,
    pub start_percent: f64,
    pub width_percent: f64,
    pub color: PaletteColor,
}

impl PhaseBar {
    #[must_use]
    pub fn end_percent(&self) -> f64 {
        self.start_percent + self.width_percent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub axis: TimeAxis,
    pub bars: Vec<PhaseBar>,
    pub months: Vec<MonthLabel>,
}

impl TimelineLayout {
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.bars.len()
    }
}

/// Lay out `phases` as a Gantt chart.
///
/// Returns `None` when no phase has both dates; callers render that as an
/// empty chart.
#[must_use]
pub fn layout(phases: &[Phase]) -> Option<TimelineLayout> {
    let dated: Vec<(usize, &Phase, NaiveDate, NaiveDate)> = phases
        .iter()
        .enumerate()
        .filter_map(|(index, phase)| phase.dates().map(|(s, e)| (index, phase, s, e)))
        .collect();

    let min_date = dated.iter().flat_map(|&(_, _, s, e)| [s, e]).min()?;
    let max_date = dated.iter().flat_map(|&(_, _, s, e)| [s, e]).max()?;
    let axis = TimeAxis::spanning(min_date, max_date);

    let bars = dated
        .into_iter()
        .enumerate()
        .map(|(position, (phase_index, phase, start, end))| {
            let start_offset_days = axis.offset_of(start);
            let duration_days = (end - start).num_days().max(0) + 1;
            PhaseBar {
                phase_index,
                name: phase.name.clone(),
                duration_label: phase.duration.clone(),
                start_date: start,
                end_date: end,
                start_offset_days,
                duration_days,
                start_percent: axis.percent_of(start_offset_days),
                width_percent: axis.percent_of(duration_days),
                color: PaletteColor::for_position(position),
            }
        })
        .collect::<Vec<_>>();

    let months = months::month_labels(&axis);

    debug!(
        phases = phases.len(),
        bars = bars.len(),
        months = months.len(),
        total_days = axis.total_days,
        "timeline laid out"
    );

    Some(TimelineLayout { axis, bars, months })
}
