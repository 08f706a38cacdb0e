//! `pw duration`: the label the phase editor would write for two dates.

use crate::output::{OutputMode, render_mode};
use anyhow::Result;
use clap::Args;
use phasewise_core::duration::{breakdown, elapsed_days};
use serde::Serialize;

use super::{fail, parse_date_arg};
use crate::output::CliError;

#[derive(Args, Debug)]
pub struct DurationArgs {
    /// Start date (YYYY-MM-DD).
    pub start: String,
    /// End date (YYYY-MM-DD).
    pub end: String,
}

#[derive(Debug, Serialize)]
struct DurationReport {
    start: String,
    end: String,
    days: u32,
    label: String,
}

pub fn run_duration(args: &DurationArgs, output: OutputMode) -> Result<()> {
    let (Some(start), Some(end)) = (
        parse_date_arg(&args.start, output)?,
        parse_date_arg(&args.end, output)?,
    ) else {
        return Err(fail(output, &CliError::new("both dates are required")));
    };

    let report = DurationReport {
        start: start.to_string(),
        end: end.to_string(),
        days: elapsed_days(start, end).unwrap_or(0),
        label: breakdown(start, end).to_string(),
    };

    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}", r.label),
        |r, w| writeln!(w, "{} → {}: {} ({} days)", r.start, r.end, r.label, r.days),
    )
}
