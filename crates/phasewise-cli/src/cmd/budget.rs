//! `pw budget`: the four budget lines of a project.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use anyhow::Result;
use clap::Subcommand;
use phasewise_core::model::Budget;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::{fail, open_project, store_failure};

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    #[command(about = "Show the budget lines and total")]
    Show {
        /// Project id or unique prefix.
        project: String,
    },

    #[command(
        about = "Change one or more budget lines",
        after_help = "EXAMPLES:\n    pw budget set k3f --personnel 120000 --contingency 15000"
    )]
    Set {
        /// Project id or unique prefix.
        project: String,
        #[arg(long)]
        personnel: Option<f64>,
        #[arg(long)]
        technology: Option<f64>,
        #[arg(long)]
        marketing: Option<f64>,
        #[arg(long)]
        contingency: Option<f64>,
    },
}

#[derive(Debug, Serialize)]
struct BudgetReport {
    project: String,
    #[serde(flatten)]
    budget: Budget,
    total: f64,
}

impl BudgetReport {
    fn new(project: &str, budget: Budget) -> Self {
        Self {
            project: project.to_string(),
            budget,
            total: budget.total(),
        }
    }
}

fn check_amount(label: &str, value: Option<f64>, output: OutputMode) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(fail(
            output,
            &CliError::new(format!("{label} must be a non-negative amount, got {v}")),
        )),
        other => Ok(other),
    }
}

fn render_text(report: &BudgetReport, w: &mut dyn Write) -> io::Result<()> {
    let b = &report.budget;
    writeln!(
        w,
        "{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
        b.personnel_costs, b.technology_tools, b.marketing_launch, b.contingency, report.total
    )
}

fn render_pretty(report: &BudgetReport, w: &mut dyn Write) -> io::Result<()> {
    let b = &report.budget;
    pretty_section(w, "Budget")?;
    pretty_kv(w, "Personnel", format!("{:>12.2}", b.personnel_costs))?;
    pretty_kv(w, "Technology", format!("{:>12.2}", b.technology_tools))?;
    pretty_kv(w, "Marketing", format!("{:>12.2}", b.marketing_launch))?;
    pretty_kv(w, "Contingency", format!("{:>12.2}", b.contingency))?;
    pretty_rule(w)?;
    pretty_kv(w, "Total", format!("{:>12.2}", report.total))
}

pub fn run_budget(command: &BudgetCommand, output: OutputMode, project_root: &Path) -> Result<()> {
    match command {
        BudgetCommand::Show { project } => {
            let (repo, id) = open_project(project_root, project, output)?;
            let budget = repo.get(&id).map_err(|err| store_failure(output, &err))?.budget;
            render_mode(output, &BudgetReport::new(&id, budget), render_text, render_pretty)
        }
        BudgetCommand::Set {
            project,
            personnel,
            technology,
            marketing,
            contingency,
        } => {
            let personnel = check_amount("--personnel", *personnel, output)?;
            let technology = check_amount("--technology", *technology, output)?;
            let marketing = check_amount("--marketing", *marketing, output)?;
            let contingency = check_amount("--contingency", *contingency, output)?;

            let (mut repo, id) = open_project(project_root, project, output)?;
            let current = repo.get(&id).map_err(|err| store_failure(output, &err))?.budget;
            let budget = Budget {
                personnel_costs: personnel.unwrap_or(current.personnel_costs),
                technology_tools: technology.unwrap_or(current.technology_tools),
                marketing_launch: marketing.unwrap_or(current.marketing_launch),
                contingency: contingency.unwrap_or(current.contingency),
            };
            repo.update_budget(&id, budget)
                .map_err(|err| store_failure(output, &err))?;
            render_mode(output, &BudgetReport::new(&id, budget), render_text, render_pretty)
        }
    }
}
