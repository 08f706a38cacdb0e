pub mod budget;
pub mod comms;
pub mod completions;
pub mod duration;
pub mod gantt;
pub mod init;
pub mod overview;
pub mod phase;
pub mod project;
pub mod risk;
pub mod team;
pub mod users;

use anyhow::Context as _;
use chrono::NaiveDate;
use phasewise_core::config::load_project_config;
use phasewise_core::record::parse_date;
use phasewise_core::{ErrorCode, JsonFileStore, ProjectRepo, StoreError};
use std::path::Path;

use crate::identity::{IdentityError, authorize_timeline_edit};
use crate::output::{CliError, OutputMode, render_error};

pub type Repo = ProjectRepo<JsonFileStore>;

/// Render `err` for the user and turn it into the command's failure.
pub fn fail(output: OutputMode, err: &CliError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, err) {
        return render_err;
    }
    anyhow::anyhow!("{}", err.message)
}

pub fn store_failure(output: OutputMode, err: &StoreError) -> anyhow::Error {
    fail(output, &CliError::from(err))
}

/// Open the workspace store with the project's configured lock timeout.
pub fn open_repo(project_root: &Path, output: OutputMode) -> anyhow::Result<Repo> {
    let config = load_project_config(project_root).map_err(|err| {
        fail(
            output,
            &CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
        )
    })?;
    let store = JsonFileStore::open(project_root)
        .map_err(|err| store_failure(output, &err))?
        .with_lock_timeout(config.store.lock_timeout());
    ProjectRepo::open(store).map_err(|err| store_failure(output, &err))
}

/// Open the store and resolve `query` to a full project id.
pub fn open_project(
    project_root: &Path,
    query: &str,
    output: OutputMode,
) -> anyhow::Result<(Repo, String)> {
    let repo = open_repo(project_root, output)?;
    let id = repo
        .resolve_id(query)
        .map_err(|err| store_failure(output, &err))?;
    Ok((repo, id))
}

/// Gate for commands that change phases.
pub fn require_editor(
    user_flag: Option<&str>,
    project_root: &Path,
    output: OutputMode,
) -> anyhow::Result<()> {
    authorize_timeline_edit(user_flag, project_root)
        .map(|_| ())
        .map_err(|err: IdentityError| fail(output, &CliError::from(&err)))
}

/// Parse a `YYYY-MM-DD` argument. An empty string clears the date.
pub fn parse_date_arg(raw: &str, output: OutputMode) -> anyhow::Result<Option<NaiveDate>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .map_err(|problem| {
            fail(
                output,
                &CliError::coded(format!("date {problem}"), ErrorCode::InvalidDate),
            )
        })
        .with_context(|| format!("invalid date argument {raw:?}"))
}

/// Parse a role/status/level argument through its `FromStr`.
pub fn parse_enum_arg<T>(raw: &str, output: OutputMode) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|err| {
        fail(
            output,
            &CliError::coded(err.to_string(), ErrorCode::InvalidEnumValue),
        )
    })
}
