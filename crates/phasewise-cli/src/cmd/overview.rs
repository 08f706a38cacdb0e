//! `pw overview`: portfolio totals across every project in the workspace.

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use anyhow::Result;
use phasewise_core::PortfolioSummary;
use std::io::{self, Write};
use std::path::Path;

use super::open_repo;

fn render_text(summary: &PortfolioSummary, w: &mut dyn Write) -> io::Result<()> {
    for p in &summary.projects {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{:.2}\t{:.1}\t{}/{}",
            p.id,
            p.name,
            p.phases,
            p.weeks,
            p.budget,
            p.completion_percent,
            p.reviewers_approved,
            p.reviewers_total
        )?;
    }
    writeln!(
        w,
        "total\t{}\t{}\t{}\t{:.2}",
        summary.total_projects, summary.total_phases, summary.total_weeks, summary.total_budget
    )
}

fn render_pretty(summary: &PortfolioSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Portfolio")?;
    pretty_kv(w, "Projects", summary.total_projects.to_string())?;
    pretty_kv(w, "Phases", summary.total_phases.to_string())?;
    pretty_kv(w, "Team members", summary.total_team_members.to_string())?;
    pretty_kv(
        w,
        "Budget",
        format!(
            "{:.2} (avg {:.2})",
            summary.total_budget, summary.average_budget
        ),
    )?;
    pretty_kv(
        w,
        "Weeks",
        format!("{} (avg {:.1})", summary.total_weeks, summary.average_weeks),
    )?;
    let risks = summary.risks_by_impact;
    pretty_kv(
        w,
        "Risks",
        format!(
            "{} ({} high, {} medium, {} low)",
            summary.total_risks, risks.high, risks.medium, risks.low
        ),
    )?;
    if !summary.high_risk_projects.is_empty() {
        pretty_kv(w, "High risk", summary.high_risk_projects.join(", "))?;
    }
    writeln!(w)?;

    if summary.projects.is_empty() {
        writeln!(w, "No projects yet.")?;
        return pretty_rule(w);
    }
    pretty_section(w, "Projects")?;
    for p in &summary.projects {
        writeln!(
            w,
            "{} {:<28} {:>3} wk ({:>5.1}%)  {:>12.2} ({:>5.1}%)  reviews {}/{} ({:.0}%)",
            p.id,
            p.name,
            p.weeks,
            p.weeks_share_percent,
            p.budget,
            p.budget_share_percent,
            p.reviewers_approved,
            p.reviewers_total,
            p.completion_percent
        )?;
    }
    pretty_rule(w)
}

pub fn run_overview(output: OutputMode, project_root: &Path) -> Result<()> {
    let repo = open_repo(project_root, output)?;
    let summary = PortfolioSummary::from_projects(repo.projects());
    tracing::debug!(projects = summary.total_projects, "overview computed");
    render_mode(output, &summary, render_text, render_pretty)
}
