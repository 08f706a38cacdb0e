use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::lock::StoreLock;
use super::{ProjectStore, StoreError, WORKSPACE_DIR};
use crate::model::Project;
use crate::record::{decode_projects, encode_project};

const PROJECTS_FILE: &str = "projects.json";
const LOCK_FILE: &str = "store.lock";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Projects kept as a pretty-printed JSON array in `.phasewise/projects.json`.
///
/// Writes go to a temporary file that is renamed over the original, under an
/// exclusive advisory lock. A missing file reads as an empty workspace.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl JsonFileStore {
    /// Open the workspace under `root`. Fails if `pw init` never ran there.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let dir = root.join(WORKSPACE_DIR);
        if !dir.is_dir() {
            return Err(StoreError::NotInitialized(root.to_path_buf()));
        }
        Ok(Self {
            dir,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Create the workspace under `root` if needed.
    ///
    /// Returns the store and whether anything was created.
    pub fn init(root: &Path) -> Result<(Self, bool), StoreError> {
        let dir = root.join(WORKSPACE_DIR);
        let existed = dir.join(PROJECTS_FILE).is_file();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;
        let store = Self {
            dir,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        };
        if !existed {
            store.save(&[])?;
            info!(path = %store.projects_path().display(), "workspace initialized");
        }
        Ok((store, !existed))
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn projects_path(&self) -> PathBuf {
        self.dir.join(PROJECTS_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

impl ProjectStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        let path = self.projects_path();
        let _lock = StoreLock::shared(&self.lock_path(), self.lock_timeout)?;

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
        let decoded = decode_projects(entries);
        debug!(
            path = %path.display(),
            projects = decoded.value.len(),
            issues = decoded.issues.len(),
            "projects loaded"
        );
        Ok(decoded.value)
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        let path = self.projects_path();
        let _lock = StoreLock::exclusive(&self.lock_path(), self.lock_timeout)?;

        let records: Vec<_> = projects.iter().map(encode_project).collect();
        let mut body = serde_json::to_string_pretty(&records).map_err(|source| {
            StoreError::Json {
                path: path.clone(),
                source,
            }
        })?;
        body.push('\n');

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), projects = projects.len(), "projects saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn open_requires_init() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = JsonFileStore::open(dir.path()).expect_err("not initialized");
        assert_eq!(err.code(), ErrorCode::NotInitialized);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, created) = JsonFileStore::init(dir.path()).expect("init");
        assert!(created);
        let (store, created) = JsonFileStore::init(dir.path()).expect("re-init");
        assert!(!created);
        assert!(store.load().expect("load").is_empty());
        assert!(store.projects_path().is_file());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (store, _) = JsonFileStore::init(dir.path()).expect("init");

        let mut project = Project::from_template("Atlas", Utc::now());
        project.phases[0].start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        project.phases[0].end_date = NaiveDate::from_ymd_opt(2024, 1, 14);
        store.save(std::slice::from_ref(&project)).expect("save");

        let reopened = JsonFileStore::open(dir.path()).expect("open");
        assert_eq!(reopened.load().expect("load"), vec![project]);
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (store, _) = JsonFileStore::init(dir.path()).expect("init");
        fs::remove_file(store.projects_path()).expect("remove");
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn non_array_file_is_a_json_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (store, _) = JsonFileStore::init(dir.path()).expect("init");
        fs::write(store.projects_path(), "{\"oops\": true}").expect("write");
        let err = store.load().expect_err("object is not an array");
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn bad_entries_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (store, _) = JsonFileStore::init(dir.path()).expect("init");
        fs::write(
            store.projects_path(),
            r#"[
                {"id": "a1", "name": "Good", "phases": [
                    {"name": "Dated", "start_date": "2024-01-01", "end_date": "2024-01-05"},
                    {"name": "Broken", "start_date": "yesterday", "end_date": "2024-01-09"}
                ]},
                {"name": "No id"}
            ]"#,
        )
        .expect("write");

        let projects = store.load().expect("load");
        assert_eq!(projects.len(), 1);
        assert!(projects[0].phases[0].is_dated());
        assert!(!projects[0].phases[1].is_dated());
    }
}
