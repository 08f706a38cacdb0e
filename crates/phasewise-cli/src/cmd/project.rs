//! `pw project`: create, list, show, rename and delete projects.

use crate::output::{
    ListRow, OutputMode, pretty_kv, pretty_rule, pretty_section, render, render_list, render_mode,
};
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use phasewise_core::leading_count;
use phasewise_core::model::{Phase, Project};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::{open_project, open_repo, store_failure};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(
        about = "Create a project from the standard template",
        after_help = "EXAMPLES:\n    pw project create \"Website Relaunch\"\n    pw project create \"Website Relaunch\" --json"
    )]
    Create {
        /// Project name.
        name: String,
    },

    #[command(about = "List projects, newest first")]
    List,

    #[command(
        about = "Show one project in full",
        after_help = "EXAMPLES:\n    # A unique id prefix is enough\n    pw project show k3f"
    )]
    Show {
        /// Project id or unique prefix.
        id: String,
    },

    #[command(about = "Rename a project")]
    Rename {
        /// Project id or unique prefix.
        id: String,
        /// New name.
        name: String,
    },

    #[command(about = "Delete a project and everything in it")]
    Delete {
        /// Project id or unique prefix.
        id: String,
    },
}

/// One row of `pw project list`.
#[derive(Debug, Serialize)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub phases: usize,
    pub weeks: u64,
    pub risks: usize,
    pub created_at: String,
}

impl ProjectRow {
    fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            phases: project.phases.len(),
            weeks: project
                .phases
                .iter()
                .map(|p| u64::from(leading_count(&p.duration)))
                .sum(),
            risks: project.risks.len(),
            created_at: project.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

impl ListRow for ProjectRow {
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "PHASES", "WEEKS", "RISKS", "CREATED"];

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {:<28} {:>2} phases  {:>3} weeks  {} risks  {}",
            self.id, self.name, self.phases, self.weeks, self.risks, self.created_at
        )
    }

    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.id, self.name, self.phases, self.weeks, self.risks, self.created_at
        )
    }
}

pub fn run_project(command: &ProjectCommand, output: OutputMode, project_root: &Path) -> Result<()> {
    match command {
        ProjectCommand::Create { name } => {
            let mut repo = open_repo(project_root, output)?;
            let project = repo
                .create_project(name, Utc::now())
                .map_err(|err| store_failure(output, &err))?;
            render(output, &project, |p, w| {
                writeln!(w, "✓ Created {} ({} phases) {}", p.name, p.phases.len(), p.id)
            })
        }
        ProjectCommand::List => {
            let repo = open_repo(project_root, output)?;
            let rows: Vec<ProjectRow> = repo.projects().iter().map(ProjectRow::from_project).collect();
            if rows.is_empty() && !output.is_json() {
                println!("No projects. Create one with `pw project create <name>`.");
                return Ok(());
            }
            render_list(&rows, output)?;
            Ok(())
        }
        ProjectCommand::Show { id } => {
            let (repo, id) = open_project(project_root, id, output)?;
            let project = repo.get(&id).map_err(|err| store_failure(output, &err))?;
            render_mode(output, project, render_project_text, render_project_pretty)
        }
        ProjectCommand::Rename { id, name } => {
            let (mut repo, id) = open_project(project_root, id, output)?;
            repo.rename_project(&id, name)
                .map_err(|err| store_failure(output, &err))?;
            let project = repo.get(&id).map_err(|err| store_failure(output, &err))?;
            render(output, project, |p, w| writeln!(w, "✓ Renamed {} to {}", p.id, p.name))
        }
        ProjectCommand::Delete { id } => {
            let (mut repo, id) = open_project(project_root, id, output)?;
            let removed = repo
                .delete_project(&id)
                .map_err(|err| store_failure(output, &err))?;
            render(output, &removed, |p, w| writeln!(w, "✓ Deleted {} ({})", p.name, p.id))
        }
    }
}

fn date_or_dash(phase: &Phase, start: bool) -> String {
    let date = if start { phase.start_date } else { phase.end_date };
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn render_project_text(project: &Project, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}\t{}", project.id, project.name)?;
    for (index, phase) in project.phases.iter().enumerate() {
        writeln!(
            w,
            "phase\t{index}\t{}\t{}\t{}\t{}",
            phase.name,
            date_or_dash(phase, true),
            date_or_dash(phase, false),
            phase.duration
        )?;
    }
    for (index, risk) in project.risks.iter().enumerate() {
        writeln!(
            w,
            "risk\t{index}\t{}\t{}\t{}",
            risk.category, risk.impact, risk.description
        )?;
    }
    writeln!(w, "budget\t{:.2}", project.budget.total())
}

fn render_project_pretty(project: &Project, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &project.name)?;
    pretty_kv(w, "ID", &project.id)?;
    pretty_kv(w, "Created", project.created_at.format("%Y-%m-%d %H:%M").to_string())?;
    pretty_kv(w, "Budget", format!("{:.2}", project.budget.total()))?;
    writeln!(w)?;

    pretty_section(w, "Phases")?;
    for (index, phase) in project.phases.iter().enumerate() {
        writeln!(
            w,
            "[{index}] {:<24} {:>10} → {:<10}  {}",
            phase.name,
            date_or_dash(phase, true),
            date_or_dash(phase, false),
            phase.duration
        )?;
        if !phase.reviewers.is_empty() {
            writeln!(
                w,
                "     reviewers: {}/{} approved",
                phase.approved_reviewers(),
                phase.reviewers.len()
            )?;
        }
        for attachment in &phase.attachments {
            writeln!(w, "     📎 {} ({} bytes)", attachment.name, attachment.size)?;
        }
    }
    writeln!(w)?;

    if !project.team_members.is_empty() {
        pretty_section(w, "Team")?;
        for member in &project.team_members {
            writeln!(
                w,
                "{:<24} {:>5}  {}",
                member.role,
                member.allocation,
                member.responsibilities.join(", ")
            )?;
        }
        writeln!(w)?;
    }

    if !project.risks.is_empty() {
        pretty_section(w, "Risks")?;
        for (index, risk) in project.risks.iter().enumerate() {
            writeln!(
                w,
                "[{index}] {} (impact {}, probability {}): {}",
                risk.category, risk.impact, risk.probability, risk.description
            )?;
        }
        writeln!(w)?;
    }

    if !project.communication.stakeholders.is_empty() {
        pretty_kv(w, "Stakeholders", project.communication.stakeholders.join(", "))?;
    }
    pretty_rule(w)
}
