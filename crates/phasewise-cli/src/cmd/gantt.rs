//! `pw gantt`: draw a project's timeline in the terminal.
//!
//! The layout itself comes from [`phasewise_core::timeline::layout`]; this
//! module only maps its percentages onto character columns.

use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use phasewise_core::config::{TimelineConfig, load_project_config};
use phasewise_core::timeline::{PhaseBar, TimelineLayout, layout};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::{open_project, store_failure};

#[derive(Args, Debug)]
pub struct GanttArgs {
    /// Project id or unique prefix.
    pub project: String,
    /// Chart width in columns (overrides `timeline.chart_width`).
    #[arg(long)]
    pub width: Option<usize>,
}

#[derive(Debug, Serialize)]
struct GanttReport {
    project: String,
    name: String,
    layout: Option<TimelineLayout>,
}

const NAME_COLUMN: usize = 24;

/// Map a percentage of the axis onto `0..=width`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn column(percent: f64, width: usize) -> usize {
    let col = (percent / 100.0 * width as f64).round();
    if col <= 0.0 { 0 } else { (col as usize).min(width) }
}

/// Columns `[start, end)` a bar occupies, at least `min_columns` wide.
fn bar_span(bar: &PhaseBar, width: usize, min_columns: usize) -> (usize, usize) {
    let start = column(bar.start_percent, width);
    let mut end = column(bar.end_percent(), width).max(start + min_columns.max(1));
    if end > width {
        end = width;
    }
    let start = start.min(end.saturating_sub(min_columns.max(1)));
    (start, end)
}

fn month_ruler(layout: &TimelineLayout, width: usize) -> String {
    let mut ruler = vec![' '; width];
    for month in &layout.months {
        let start = column(month.position_percent, width);
        let end = column(month.end_percent(), width);
        if start < width {
            ruler[start] = '|';
        }
        for (offset, ch) in month.label.chars().enumerate() {
            let at = start + 1 + offset;
            if at >= end || at >= width {
                break;
            }
            ruler[at] = ch;
        }
    }
    ruler.into_iter().collect::<String>().trim_end().to_string()
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut short: String = name.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

/// Render the chart body as lines of text.
#[must_use]
pub fn draw_chart(layout: &TimelineLayout, config: &TimelineConfig, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::with_capacity(layout.bars.len() + 1);

    if config.show_months {
        lines.push(format!(
            "{:<NAME_COLUMN$} {}",
            "",
            month_ruler(layout, width)
        ));
    }

    for bar in &layout.bars {
        let (start, end) = bar_span(bar, width, config.min_bar_columns);
        let glyph = bar.color.glyph();
        let row: String = (0..width)
            .map(|col| if (start..end).contains(&col) { glyph } else { '·' })
            .collect();
        lines.push(format!(
            "{:<NAME_COLUMN$} {row}  {}",
            truncate(&bar.name, NAME_COLUMN),
            bar.duration_label
        ));
    }
    lines
}

fn render_text(report: &GanttReport, w: &mut dyn Write) -> io::Result<()> {
    let Some(layout) = &report.layout else {
        return Ok(());
    };
    for bar in &layout.bars {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}",
            bar.phase_index,
            bar.name,
            bar.start_date,
            bar.end_date,
            bar.duration_days,
            bar.start_percent,
            bar.width_percent,
            bar.color
        )?;
    }
    Ok(())
}

pub fn run_gantt(args: &GanttArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root).unwrap_or_default();
    let (repo, id) = open_project(project_root, &args.project, output)?;
    let project = repo.get(&id).map_err(|err| store_failure(output, &err))?;
    let width = args.width.unwrap_or(config.timeline.chart_width);

    let report = GanttReport {
        project: project.id.clone(),
        name: project.name.clone(),
        layout: layout(&project.phases),
    };

    render_mode(output, &report, render_text, |r, w| {
        pretty_section(w, &r.name)?;
        let Some(layout) = &r.layout else {
            writeln!(w, "No dated phases. Set dates with `pw phase update`.")?;
            return pretty_rule(w);
        };
        writeln!(
            w,
            "{} → {} ({} days, {} of {} phases dated)",
            layout.axis.min_date,
            layout.axis.max_date,
            layout.axis.total_days,
            layout.phase_count(),
            project.phases.len()
        )?;
        writeln!(w)?;
        for line in draw_chart(layout, &config.timeline, width) {
            writeln!(w, "{line}")?;
        }
        pretty_rule(w)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use phasewise_core::model::Phase;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    fn two_phase_layout() -> TimelineLayout {
        let phases = vec![
            Phase::new("Plan", "").with_dates(d(2024, 1, 1), d(2024, 1, 10)),
            Phase::new("Build", "").with_dates(d(2024, 1, 11), d(2024, 1, 20)),
        ];
        layout(&phases).expect("dated phases")
    }

    #[test]
    fn column_clamps_to_width() {
        assert_eq!(column(0.0, 40), 0);
        assert_eq!(column(50.0, 40), 20);
        assert_eq!(column(100.0, 40), 40);
        assert_eq!(column(130.0, 40), 40);
        assert_eq!(column(-5.0, 40), 0);
    }

    #[test]
    fn back_to_back_bars_split_the_chart() {
        let layout = two_phase_layout();
        let config = TimelineConfig {
            show_months: false,
            ..TimelineConfig::default()
        };
        let lines = draw_chart(&layout, &config, 20);
        assert_eq!(lines.len(), 2);

        let plan: String = lines[0].chars().skip(NAME_COLUMN + 1).take(20).collect();
        let build: String = lines[1].chars().skip(NAME_COLUMN + 1).take(20).collect();
        assert_eq!(plan, format!("{}{}", "█".repeat(10), "·".repeat(10)));
        assert_eq!(build, format!("{}{}", "·".repeat(10), "▓".repeat(10)));
    }

    #[test]
    fn tiny_bars_keep_minimum_width() {
        let phases = vec![
            Phase::new("Kickoff", "").with_dates(d(2024, 1, 1), d(2024, 1, 1)),
            Phase::new("Long", "").with_dates(d(2024, 1, 2), d(2024, 12, 31)),
        ];
        let layout = layout(&phases).expect("dated phases");
        let (start, end) = bar_span(&layout.bars[0], 40, 2);
        assert_eq!(start, 0);
        assert_eq!(end - start, 2);
    }

    #[test]
    fn bar_at_the_right_edge_stays_inside() {
        let phases = vec![
            Phase::new("Long", "").with_dates(d(2024, 1, 1), d(2024, 12, 30)),
            Phase::new("Last", "").with_dates(d(2024, 12, 31), d(2024, 12, 31)),
        ];
        let layout = layout(&phases).expect("dated phases");
        let (start, end) = bar_span(&layout.bars[1], 40, 3);
        assert_eq!(end, 40);
        assert_eq!(start, 37);
    }

    #[test]
    fn month_ruler_marks_each_month() {
        let phases = vec![Phase::new("Q1", "").with_dates(d(2024, 1, 1), d(2024, 3, 31))];
        let layout = layout(&phases).expect("dated phases");
        let ruler = month_ruler(&layout, 91);
        assert_eq!(ruler.matches('|').count(), 3);
        assert!(ruler.starts_with('|'));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Short", 10), "Short");
        let cut = truncate("A very long phase name indeed", 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
    }
}
