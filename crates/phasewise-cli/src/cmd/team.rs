//! `pw team`: roles, responsibilities and allocation.

use crate::output::{CliError, ListRow, OutputMode, render, render_list};
use anyhow::Result;
use clap::Subcommand;
use phasewise_core::model::TeamMember;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::{Repo, fail, open_project, store_failure};

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    #[command(about = "List team members")]
    List {
        /// Project id or unique prefix.
        project: String,
    },

    #[command(
        about = "Add a team member",
        after_help = "EXAMPLES:\n    pw team add k3f \"QA Lead\" --allocation 50% -r \"Test plans\" -r \"Release sign-off\""
    )]
    Add {
        /// Project id or unique prefix.
        project: String,
        /// Role title.
        role: String,
        #[arg(long, default_value = "100%")]
        allocation: String,
        /// A responsibility; repeat for several.
        #[arg(short, long = "responsibility")]
        responsibilities: Vec<String>,
    },

    #[command(about = "Remove a team member by index")]
    Remove {
        /// Project id or unique prefix.
        project: String,
        /// Member index (0-based).
        index: usize,
    },

    #[command(about = "Remove every team member")]
    Clear {
        /// Project id or unique prefix.
        project: String,
    },
}

#[derive(Debug, Serialize)]
pub struct MemberRow {
    pub index: usize,
    #[serde(flatten)]
    pub member: TeamMember,
}

impl ListRow for MemberRow {
    const COLUMNS: &'static [&'static str] = &["INDEX", "ROLE", "ALLOCATION", "RESPONSIBILITIES"];

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "[{}] {:<24} {:>5}  {}",
            self.index,
            self.member.role,
            self.member.allocation,
            self.member.responsibilities.join(", ")
        )
    }

    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.index,
            self.member.role,
            self.member.allocation,
            self.member.responsibilities.join("; ")
        )
    }
}

fn current_team(repo: &Repo, id: &str, output: OutputMode) -> Result<Vec<TeamMember>> {
    Ok(repo
        .get(id)
        .map_err(|err| store_failure(output, &err))?
        .team_members
        .clone())
}

#[derive(Debug, Serialize)]
struct TeamReport {
    project: String,
    size: usize,
}

pub fn run_team(command: &TeamCommand, output: OutputMode, project_root: &Path) -> Result<()> {
    match command {
        TeamCommand::List { project } => {
            let (repo, id) = open_project(project_root, project, output)?;
            let rows: Vec<MemberRow> = current_team(&repo, &id, output)?
                .into_iter()
                .enumerate()
                .map(|(index, member)| MemberRow { index, member })
                .collect();
            if rows.is_empty() && !output.is_json() {
                println!("No team members.");
                return Ok(());
            }
            render_list(&rows, output)?;
            Ok(())
        }
        TeamCommand::Add {
            project,
            role,
            allocation,
            responsibilities,
        } => {
            let (mut repo, id) = open_project(project_root, project, output)?;
            let mut team = current_team(&repo, &id, output)?;
            let member = TeamMember {
                role: role.clone(),
                responsibilities: responsibilities.clone(),
                allocation: allocation.clone(),
            };
            team.push(member.clone());
            let index = team.len() - 1;
            repo.update_team(&id, team)
                .map_err(|err| store_failure(output, &err))?;
            render(output, &MemberRow { index, member }, |r, w| {
                writeln!(w, "✓ Added {} ({})", r.member.role, r.member.allocation)
            })
        }
        TeamCommand::Remove { project, index } => {
            let (mut repo, id) = open_project(project_root, project, output)?;
            let mut team = current_team(&repo, &id, output)?;
            if *index >= team.len() {
                return Err(fail(
                    output,
                    &CliError::new(format!(
                        "project {id} has no team member {index} (it has {})",
                        team.len()
                    )),
                ));
            }
            let member = team.remove(*index);
            repo.update_team(&id, team)
                .map_err(|err| store_failure(output, &err))?;
            render(output, &MemberRow { index: *index, member }, |r, w| {
                writeln!(w, "✓ Removed {}", r.member.role)
            })
        }
        TeamCommand::Clear { project } => {
            let (mut repo, id) = open_project(project_root, project, output)?;
            repo.update_team(&id, Vec::new())
                .map_err(|err| store_failure(output, &err))?;
            render(output, &TeamReport { project: id, size: 0 }, |r, w| {
                writeln!(w, "✓ Cleared team of {}", r.project)
            })
        }
    }
}
