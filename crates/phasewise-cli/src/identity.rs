//! Acting-user resolution for commands that change a timeline.
//!
//! The resolution chain: `--user` flag > `PHASEWISE_USER` env. With no
//! identity, commands run unchecked. With one, the user must exist in the
//! workspace directory and hold a role that may edit timelines.

use phasewise_core::model::{User, UserRole};
use phasewise_core::{ErrorCode, StoreError};
use phasewise_core::users::{JsonUserSource, UserDirectory, UserSource};
use std::env;
use std::path::Path;

use crate::output::CliError;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("user '{username}' has role {role} and may not edit the timeline")]
    NotAnEditor { username: String, role: UserRole },

    #[error(transparent)]
    Directory(#[from] StoreError),
}

impl IdentityError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownUser(_) => ErrorCode::UnknownUser,
            Self::NotAnEditor { .. } => ErrorCode::TimelineEditDenied,
            Self::Directory(err) => err.code(),
        }
    }
}

impl From<&IdentityError> for CliError {
    fn from(err: &IdentityError) -> Self {
        Self::coded(err.to_string(), err.code())
    }
}

/// Where identity env vars come from; tests swap in a map.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

fn resolve_user_with(cli_flag: Option<&str>, env: &dyn EnvReader) -> Option<String> {
    if let Some(user) = cli_flag.filter(|u| !u.is_empty()) {
        return Some(user.to_string());
    }
    env.get("PHASEWISE_USER")
}

pub fn resolve_user(cli_flag: Option<&str>) -> Option<String> {
    resolve_user_with(cli_flag, &RealEnv)
}

fn check_editor<S: UserSource>(
    username: &str,
    directory: &UserDirectory<S>,
) -> Result<User, IdentityError> {
    let user = directory
        .find(username)
        .ok_or_else(|| IdentityError::UnknownUser(username.to_string()))?;
    if !user.role.can_edit_timeline() {
        return Err(IdentityError::NotAnEditor {
            username: username.to_string(),
            role: user.role,
        });
    }
    Ok(user.clone())
}

/// Check the acting user, if any, may change phases in `project_root`.
///
/// Returns the user when one was named.
pub fn authorize_timeline_edit(
    cli_flag: Option<&str>,
    project_root: &Path,
) -> Result<Option<User>, IdentityError> {
    let Some(username) = resolve_user(cli_flag) else {
        return Ok(None);
    };
    let directory = UserDirectory::new(JsonUserSource::in_workspace(project_root))?;
    let user = check_editor(&username, &directory)?;
    tracing::debug!(user = %user.username, role = %user.role, "timeline edit authorized");
    Ok(Some(user))
}
