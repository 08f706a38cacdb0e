//! `pw phase`: edit the phases of a project.
//!
//! Updates go through a [`PhaseDraft`], so setting both dates always
//! rewrites the duration label, exactly as the editor form does.

use crate::output::{CliError, OutputMode, render};
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use phasewise_core::editor::{EditError, PhaseDraft};
use phasewise_core::model::{NewAttachment, Phase, ReviewStatus, UserRole};
use serde::Serialize;
use std::path::Path;

use super::{Repo, fail, open_project, parse_date_arg, parse_enum_arg, require_editor, store_failure};

#[derive(Subcommand, Debug)]
pub enum PhaseCommand {
    #[command(about = "Append a blank phase")]
    Add {
        /// Project id or unique prefix.
        project: String,
    },

    #[command(
        about = "Change a phase's name, dates, duration or description",
        after_help = "EXAMPLES:\n    # Dates set the duration label automatically\n    pw phase update k3f 0 --start 2024-01-01 --end 2024-01-10\n\n    # A typed duration only sticks while a date is missing\n    pw phase update k3f 2 --duration \"6 weeks\"\n\n    # An empty value clears a date\n    pw phase update k3f 2 --end \"\""
    )]
    Update(UpdateArgs),

    #[command(about = "Remove a phase")]
    Delete {
        /// Project id or unique prefix.
        project: String,
        /// Phase index (0-based).
        index: usize,
    },

    #[command(about = "Record an uploaded file on a phase")]
    Attach(AttachArgs),

    #[command(about = "Manage review sign-offs on a phase")]
    Reviewer {
        #[command(subcommand)]
        command: ReviewerCommand,
    },
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project id or unique prefix.
    pub project: String,
    /// Phase index (0-based).
    pub index: usize,
    #[arg(long)]
    pub name: Option<String>,
    /// Start date (YYYY-MM-DD); empty clears it.
    #[arg(long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD); empty clears it.
    #[arg(long)]
    pub end: Option<String>,
    /// Free-text duration label.
    #[arg(long)]
    pub duration: Option<String>,
    /// Phase description.
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Project id or unique prefix.
    pub project: String,
    /// Phase index (0-based).
    pub index: usize,
    #[arg(long)]
    pub name: String,
    /// Media type, e.g. `application/pdf`.
    #[arg(long = "type", default_value = "application/octet-stream")]
    pub media_type: String,
    /// Size in bytes.
    #[arg(long, default_value_t = 0)]
    pub size: u64,
    #[arg(long)]
    pub url: String,
}

#[derive(Subcommand, Debug)]
pub enum ReviewerCommand {
    #[command(about = "Add a pending reviewer for a role")]
    Add {
        project: String,
        index: usize,
        /// Reviewer role, e.g. `sponsor`. Any role but admin, once per phase.
        role: String,
    },

    #[command(about = "Approve or reject as a reviewer")]
    Decide {
        project: String,
        index: usize,
        /// Reviewer id.
        reviewer: String,
        /// `approved` or `rejected`.
        status: String,
        #[arg(long)]
        comment: Option<String>,
    },

    #[command(about = "Remove a reviewer")]
    Remove {
        project: String,
        index: usize,
        /// Reviewer id.
        reviewer: String,
    },
}

#[derive(Debug, Serialize)]
struct PhaseReport<'a> {
    project: &'a str,
    index: usize,
    phase: &'a Phase,
}

fn edit_failure(output: OutputMode, err: &EditError) -> anyhow::Error {
    fail(output, &CliError::coded(err.to_string(), err.code()))
}

fn current_phase(repo: &Repo, id: &str, index: usize, output: OutputMode) -> Result<Phase> {
    let project = repo.get(id).map_err(|err| store_failure(output, &err))?;
    project.phases.get(index).cloned().ok_or_else(|| {
        store_failure(
            output,
            &phasewise_core::StoreError::PhaseIndexOutOfRange {
                project: id.to_string(),
                index,
                len: project.phases.len(),
            },
        )
    })
}

fn render_phase(output: OutputMode, project: &str, index: usize, phase: &Phase, verb: &str) -> Result<()> {
    let report = PhaseReport {
        project,
        index,
        phase,
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ {verb} phase {} \"{}\" ({})", r.index, r.phase.name, r.phase.duration)
    })
}

pub fn run_phase(
    command: &PhaseCommand,
    user: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    match command {
        PhaseCommand::Add { project } => {
            require_editor(user, project_root, output)?;
            let (mut repo, id) = open_project(project_root, project, output)?;
            let index = repo.add_phase(&id).map_err(|err| store_failure(output, &err))?;
            let phase = current_phase(&repo, &id, index, output)?;
            render_phase(output, &id, index, &phase, "Added")
        }
        PhaseCommand::Update(args) => {
            require_editor(user, project_root, output)?;
            let (mut repo, id) = open_project(project_root, &args.project, output)?;
            let mut draft = PhaseDraft::begin(&current_phase(&repo, &id, args.index, output)?);

            if let Some(name) = &args.name {
                draft.set_name(name.as_str());
            }
            if let Some(content) = &args.content {
                draft.set_content(content.as_str());
            }
            if let Some(label) = &args.duration {
                draft.set_duration(label.as_str());
            }
            if let Some(raw) = &args.start {
                draft.set_start_date(parse_date_arg(raw, output)?);
            }
            if let Some(raw) = &args.end {
                draft.set_end_date(parse_date_arg(raw, output)?);
            }

            let phase = repo
                .update_phase(&id, args.index, draft.commit())
                .map_err(|err| store_failure(output, &err))?;
            render_phase(output, &id, args.index, &phase, "Updated")
        }
        PhaseCommand::Delete { project, index } => {
            require_editor(user, project_root, output)?;
            let (mut repo, id) = open_project(project_root, project, output)?;
            let removed = repo
                .delete_phase(&id, *index)
                .map_err(|err| store_failure(output, &err))?;
            render_phase(output, &id, *index, &removed, "Deleted")
        }
        PhaseCommand::Attach(args) => {
            require_editor(user, project_root, output)?;
            let (mut repo, id) = open_project(project_root, &args.project, output)?;
            let attachment = repo
                .add_phase_attachment(
                    &id,
                    args.index,
                    NewAttachment {
                        name: args.name.clone(),
                        media_type: args.media_type.clone(),
                        size: args.size,
                        url: args.url.clone(),
                    },
                    Utc::now(),
                )
                .map_err(|err| store_failure(output, &err))?;
            render(output, &attachment, |a, w| {
                writeln!(w, "✓ Attached {} to phase {} ({})", a.name, args.index, a.id)
            })
        }
        PhaseCommand::Reviewer { command } => run_reviewer(command, user, output, project_root),
    }
}

fn run_reviewer(
    command: &ReviewerCommand,
    user: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    require_editor(user, project_root, output)?;
    let (project, index) = match command {
        ReviewerCommand::Add { project, index, .. }
        | ReviewerCommand::Decide { project, index, .. }
        | ReviewerCommand::Remove { project, index, .. } => (project, *index),
    };
    let (mut repo, id) = open_project(project_root, project, output)?;
    let mut draft = PhaseDraft::begin(&current_phase(&repo, &id, index, output)?);

    let message = match command {
        ReviewerCommand::Add { role, .. } => {
            let role: UserRole = parse_enum_arg(role, output)?;
            let reviewer = draft
                .add_reviewer(role)
                .map_err(|err| edit_failure(output, &err))?;
            format!("Added reviewer {reviewer} ({role})")
        }
        ReviewerCommand::Decide {
            reviewer,
            status,
            comment,
            ..
        } => {
            let status: ReviewStatus = parse_enum_arg(status, output)?;
            draft
                .set_reviewer_status(reviewer, status, Utc::now())
                .map_err(|err| edit_failure(output, &err))?;
            if let Some(comment) = comment {
                draft
                    .set_reviewer_comment(reviewer, comment.as_str())
                    .map_err(|err| edit_failure(output, &err))?;
            }
            format!("Reviewer {reviewer} {status}")
        }
        ReviewerCommand::Remove { reviewer, .. } => {
            let removed = draft
                .remove_reviewer(reviewer)
                .map_err(|err| edit_failure(output, &err))?;
            format!("Removed reviewer {} ({})", removed.id, removed.role)
        }
    };

    let phase = repo
        .update_phase(&id, index, draft.commit())
        .map_err(|err| store_failure(output, &err))?;
    tracing::info!(project = %id, index, "{message}");
    let report = PhaseReport {
        project: &id,
        index,
        phase: &phase,
    };
    render(output, &report, |_, w| writeln!(w, "✓ {message}"))
}
