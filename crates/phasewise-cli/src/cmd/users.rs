//! `pw users`: the user directory for this workspace.

use crate::output::{CliError, ListRow, OutputMode, render_list};
use anyhow::Result;
use phasewise_core::model::User;
use phasewise_core::users::JsonUserSource;
use phasewise_core::UserDirectory;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::fail;

#[derive(Debug, Serialize)]
pub struct UserRow {
    #[serde(flatten)]
    pub user: User,
    pub can_edit_timeline: bool,
}

impl ListRow for UserRow {
    const COLUMNS: &'static [&'static str] = &["USERNAME", "NAME", "EMAIL", "ROLE", "DEPARTMENT", "EDITS_TIMELINE"];

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        let editor = if self.can_edit_timeline { "  ✎ timeline" } else { "" };
        writeln!(
            w,
            "{:<20} {:<24} {:<18} {}{editor}",
            self.user.username,
            self.user.name,
            self.user.role.as_str(),
            self.user.department
        )
    }

    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.user.username,
            self.user.name,
            self.user.email,
            self.user.role,
            self.user.department,
            self.can_edit_timeline
        )
    }
}

pub fn run_users(output: OutputMode, project_root: &Path) -> Result<()> {
    let source = JsonUserSource::in_workspace(project_root);
    let directory = UserDirectory::new(source)
        .map_err(|err| fail(output, &CliError::coded(err.to_string(), err.code())))?;
    let rows: Vec<UserRow> = directory
        .users()
        .iter()
        .map(|user| UserRow {
            can_edit_timeline: user.role.can_edit_timeline(),
            user: user.clone(),
        })
        .collect();
    render_list(&rows, output)?;
    Ok(())
}
