//! Persistence for projects.
//!
//! Storage sits behind the small [`ProjectStore`] load/save contract so the
//! backing medium can be swapped: [`MemoryStore`] for tests and demos,
//! [`JsonFileStore`] for the on-disk `.phasewise/` workspace. All mutation
//! logic lives in [`ProjectRepo`], which works against any store.

mod file;
pub mod lock;
mod repo;

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::ErrorCode;
use crate::model::Project;

pub use file::JsonFileStore;
pub use lock::LockError;
pub use repo::ProjectRepo;

/// Name of the per-workspace directory holding projects, users and config.
pub const WORKSPACE_DIR: &str = ".phasewise";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no {WORKSPACE_DIR}/ workspace at {0}")]
    NotInitialized(PathBuf),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("ambiguous project id '{prefix}': matches {count} projects")]
    AmbiguousId { prefix: String, count: usize },

    #[error("project {project} has no phase {index} (it has {len})")]
    PhaseIndexOutOfRange {
        project: String,
        index: usize,
        len: usize,
    },

    #[error("project {project} has no risk {index} (it has {len})")]
    RiskIndexOutOfRange {
        project: String,
        index: usize,
        len: usize,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a JSON array of records: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized(_) => ErrorCode::NotInitialized,
            Self::ProjectNotFound(_) => ErrorCode::ProjectNotFound,
            Self::AmbiguousId { .. } => ErrorCode::AmbiguousId,
            Self::PhaseIndexOutOfRange { .. } => ErrorCode::PhaseIndexOutOfRange,
            Self::RiskIndexOutOfRange { .. } => ErrorCode::RiskIndexOutOfRange,
            Self::Read { .. } => ErrorCode::StoreReadFailed,
            Self::Write { .. } => ErrorCode::StoreWriteFailed,
            Self::Json { .. } => ErrorCode::MalformedRecord,
            Self::Lock(err) => err.code(),
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Load/save contract for the full project list.
///
/// Stores hold no business rules: they persist exactly the slice handed to
/// [`save`](Self::save) and hand it back from [`load`](Self::load).
pub trait ProjectStore {
    fn load(&self) -> Result<Vec<Project>, StoreError>;
    fn save(&self, projects: &[Project]) -> Result<(), StoreError>;
}

impl<S: ProjectStore + ?Sized> ProjectStore for &S {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        (**self).load()
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        (**self).save(projects)
    }
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: Mutex<Vec<Project>>,
}

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            projects: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
        }
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        *self.projects.lock().unwrap_or_else(PoisonError::into_inner) = projects.to_vec();
        Ok(())
    }
}
