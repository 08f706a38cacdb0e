//! `pw comms`: stakeholders and recurring meetings.

use crate::output::{CliError, OutputMode, pretty_rule, pretty_section, render, render_mode};
use anyhow::Result;
use clap::Subcommand;
use phasewise_core::model::{Communication, Meeting};
use std::io::{self, Write};
use std::path::Path;

use super::{Repo, fail, open_project, store_failure};

#[derive(Subcommand, Debug)]
pub enum CommsCommand {
    #[command(about = "Show the communication plan")]
    Show {
        /// Project id or unique prefix.
        project: String,
    },

    #[command(about = "Add a stakeholder")]
    AddStakeholder {
        project: String,
        name: String,
    },

    #[command(about = "Remove a stakeholder by name")]
    RemoveStakeholder {
        project: String,
        name: String,
    },

    #[command(
        about = "Add a recurring meeting",
        after_help = "EXAMPLES:\n    pw comms add-meeting k3f \"Weekly sync\" --schedule \"Mondays 10:00\" --audience \"Core team\""
    )]
    AddMeeting {
        project: String,
        title: String,
        #[arg(long, default_value = "")]
        schedule: String,
        #[arg(long, default_value = "")]
        audience: String,
        /// Agenda or notes.
        #[arg(long, default_value = "")]
        content: String,
    },

    #[command(about = "Remove a meeting by index")]
    RemoveMeeting {
        project: String,
        /// Meeting index (0-based).
        index: usize,
    },
}

fn current_plan(repo: &Repo, id: &str, output: OutputMode) -> Result<Communication> {
    Ok(repo
        .get(id)
        .map_err(|err| store_failure(output, &err))?
        .communication
        .clone())
}

fn render_text(plan: &Communication, w: &mut dyn Write) -> io::Result<()> {
    for name in &plan.stakeholders {
        writeln!(w, "stakeholder\t{name}")?;
    }
    for (index, meeting) in plan.meetings.iter().enumerate() {
        writeln!(
            w,
            "meeting\t{index}\t{}\t{}\t{}",
            meeting.title, meeting.schedule, meeting.audience
        )?;
    }
    Ok(())
}

fn render_pretty(plan: &Communication, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Stakeholders")?;
    if plan.stakeholders.is_empty() {
        writeln!(w, "(none)")?;
    }
    for name in &plan.stakeholders {
        writeln!(w, "• {name}")?;
    }
    writeln!(w)?;
    pretty_section(w, "Meetings")?;
    if plan.meetings.is_empty() {
        writeln!(w, "(none)")?;
    }
    for (index, meeting) in plan.meetings.iter().enumerate() {
        writeln!(w, "[{index}] {} ({})", meeting.title, meeting.schedule)?;
        if !meeting.audience.is_empty() {
            writeln!(w, "     audience: {}", meeting.audience)?;
        }
        if !meeting.content.is_empty() {
            writeln!(w, "     {}", meeting.content)?;
        }
    }
    pretty_rule(w)
}

pub fn run_comms(command: &CommsCommand, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = match command {
        CommsCommand::Show { project }
        | CommsCommand::AddStakeholder { project, .. }
        | CommsCommand::RemoveStakeholder { project, .. }
        | CommsCommand::AddMeeting { project, .. }
        | CommsCommand::RemoveMeeting { project, .. } => project,
    };
    let (mut repo, id) = open_project(project_root, project, output)?;
    let mut plan = current_plan(&repo, &id, output)?;

    let message = match command {
        CommsCommand::Show { .. } => {
            return render_mode(output, &plan, render_text, render_pretty);
        }
        CommsCommand::AddStakeholder { name, .. } => {
            plan.stakeholders.push(name.clone());
            format!("Added stakeholder {name}")
        }
        CommsCommand::RemoveStakeholder { name, .. } => {
            let before = plan.stakeholders.len();
            plan.stakeholders.retain(|s| s != name);
            if plan.stakeholders.len() == before {
                return Err(fail(
                    output,
                    &CliError::new(format!("no stakeholder named '{name}'")),
                ));
            }
            format!("Removed stakeholder {name}")
        }
        CommsCommand::AddMeeting {
            title,
            schedule,
            audience,
            content,
            ..
        } => {
            plan.meetings.push(Meeting {
                title: title.clone(),
                schedule: schedule.clone(),
                audience: audience.clone(),
                content: content.clone(),
            });
            format!("Added meeting {title}")
        }
        CommsCommand::RemoveMeeting { index, .. } => {
            if *index >= plan.meetings.len() {
                return Err(fail(
                    output,
                    &CliError::new(format!(
                        "no meeting {index} (there are {})",
                        plan.meetings.len()
                    )),
                ));
            }
            let removed = plan.meetings.remove(*index);
            format!("Removed meeting {}", removed.title)
        }
    };

    repo.update_communication(&id, plan.clone())
        .map_err(|err| store_failure(output, &err))?;
    render(output, &plan, |_, w| writeln!(w, "✓ {message}"))
}
