//! Known users and change notification.
//!
//! The directory re-reads its [`UserSource`] only when [`UserDirectory::refresh`]
//! is called. Subscribers hear about a refresh only if the user set changed.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::model::{User, UserRole};
use crate::store::{StoreError, WORKSPACE_DIR};

pub trait UserSource {
    fn load_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Fixed user list. [`StaticUserSource::builtin`] holds the demo and admin accounts.
#[derive(Debug, Clone, Default)]
pub struct StaticUserSource {
    users: Vec<User>,
}

impl StaticUserSource {
    #[must_use]
    pub const fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_users())
    }
}

impl UserSource for StaticUserSource {
    fn load_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.clone())
    }
}

#[must_use]
pub fn builtin_users() -> Vec<User> {
    vec![
        User {
            id: "demo".into(),
            username: "demo".into(),
            name: "Demo User".into(),
            email: "demo@company.com".into(),
            role: UserRole::ProductManager1,
            department: "Product".into(),
        },
        User {
            id: "admin".into(),
            username: "admin".into(),
            name: "System Administrator".into(),
            email: "admin@company.com".into(),
            role: UserRole::Admin,
            department: "IT".into(),
        },
    ]
}

/// Users kept in `.phasewise/users.json`.
///
/// A missing file yields the built-in users. Entries that do not decode are
/// skipped with a warning. Entries without an id use their username.
#[derive(Debug, Clone)]
pub struct JsonUserSource {
    path: PathBuf,
}

#[derive(Deserialize)]
struct StoredUser {
    #[serde(default)]
    id: String,
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    role: UserRole,
    #[serde(default)]
    department: String,
}

impl JsonUserSource {
    #[must_use]
    pub fn in_workspace(root: &Path) -> Self {
        Self {
            path: root.join(WORKSPACE_DIR).join("users.json"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserSource for JsonUserSource {
    fn load_users(&self) -> Result<Vec<User>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(builtin_users()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;

        let users = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value::<StoredUser>(entry) {
                Ok(stored) => Some(User {
                    id: if stored.id.is_empty() {
                        stored.username.clone()
                    } else {
                        stored.id
                    },
                    username: stored.username,
                    name: stored.name,
                    email: stored.email,
                    role: stored.role,
                    department: stored.department,
                }),
                Err(err) => {
                    warn!(path = %self.path.display(), index = i, error = %err, "skipping malformed user");
                    None
                }
            })
            .collect();
        Ok(users)
    }
}

/// Handle returned by [`UserDirectory::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&[User]) + Send>;

pub struct UserDirectory<S> {
    source: S,
    users: Vec<User>,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: u64,
}

impl<S> fmt::Debug for UserDirectory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDirectory")
            .field("users", &self.users)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

fn sorted_by_id(users: &[User]) -> Vec<&User> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by(|a, b| (&a.id, &a.username).cmp(&(&b.id, &b.username)));
    sorted
}

fn same_users(a: &[User], b: &[User]) -> bool {
    a.len() == b.len() && sorted_by_id(a) == sorted_by_id(b)
}

impl<S: UserSource> UserDirectory<S> {
    pub fn new(source: S) -> Result<Self, StoreError> {
        let users = source.load_users()?;
        debug!(users = users.len(), "user directory loaded");
        Ok(Self {
            source,
            users,
            subscribers: Vec::new(),
            next_id: 0,
        })
    }

    /// Re-read the source. Returns `true` and notifies subscribers when the
    /// user set differs from the previous one. Order in the source is
    /// ignored.
    pub fn refresh(&mut self) -> Result<bool, StoreError> {
        let users = self.source.load_users()?;
        if same_users(&users, &self.users) {
            return Ok(false);
        }
        info!(before = self.users.len(), after = users.len(), "user directory changed");
        self.users = users;
        for (_, callback) in &mut self.subscribers {
            callback(&self.users);
        }
        Ok(true)
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn find(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&[User]) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct SharedSource(Arc<Mutex<Vec<User>>>);

    impl UserSource for SharedSource {
        fn load_users(&self) -> Result<Vec<User>, StoreError> {
            Ok(self.0.lock().expect("lock").clone())
        }
    }

    fn user(username: &str, role: UserRole) -> User {
        User {
            id: username.into(),
            username: username.into(),
            name: username.to_uppercase(),
            email: format!("{username}@company.com"),
            role,
            department: String::new(),
        }
    }

    #[test]
    fn builtin_has_demo_and_admin() {
        let dir = UserDirectory::new(StaticUserSource::builtin()).expect("load");
        assert_eq!(dir.users().len(), 2);
        assert_eq!(dir.find("admin").expect("admin").role, UserRole::Admin);
        assert_eq!(
            dir.find("demo").expect("demo").role,
            UserRole::ProductManager1
        );
        assert!(dir.find("nobody").is_none());
    }

    #[test]
    fn callbacks_fire_only_on_change() {
        let shared = Arc::new(Mutex::new(vec![user("ana", UserRole::Designer)]));
        let mut dir = UserDirectory::new(SharedSource(Arc::clone(&shared))).expect("load");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dir.subscribe(move |users| sink.lock().expect("lock").push(users.len()));

        assert!(!dir.refresh().expect("refresh"));
        assert!(seen.lock().expect("lock").is_empty());

        shared
            .lock()
            .expect("lock")
            .push(user("ben", UserRole::Sponsor));
        assert!(dir.refresh().expect("refresh"));
        assert!(!dir.refresh().expect("refresh"));
        assert_eq!(*seen.lock().expect("lock"), vec![2]);
    }

    #[test]
    fn reordering_is_not_a_change() {
        let shared = Arc::new(Mutex::new(vec![
            user("ana", UserRole::Designer),
            user("ben", UserRole::Sponsor),
        ]));
        let mut dir = UserDirectory::new(SharedSource(Arc::clone(&shared))).expect("load");
        let fired = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&fired);
        dir.subscribe(move |_| *sink.lock().expect("lock") = true);

        shared.lock().expect("lock").reverse();
        assert!(!dir.refresh().expect("refresh"));
        assert!(!*fired.lock().expect("lock"));

        shared.lock().expect("lock")[0].role = UserRole::Operator2;
        assert!(dir.refresh().expect("refresh"));
        assert!(*fired.lock().expect("lock"));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let shared = Arc::new(Mutex::new(Vec::new()));
        let mut dir = UserDirectory::new(SharedSource(Arc::clone(&shared))).expect("load");

        let count = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&count);
        let id = dir.subscribe(move |_| *sink.lock().expect("lock") += 1);
        assert!(dir.unsubscribe(id));
        assert!(!dir.unsubscribe(id));

        shared
            .lock()
            .expect("lock")
            .push(user("cy", UserRole::Operator1));
        assert!(dir.refresh().expect("refresh"));
        assert_eq!(*count.lock().expect("lock"), 0);
    }

    #[test]
    fn json_source_falls_back_to_builtin() {
        let root = tempfile::tempdir().expect("tempdir");
        let source = JsonUserSource::in_workspace(root.path());
        assert_eq!(source.load_users().expect("load"), builtin_users());
    }

    #[test]
    fn json_source_skips_bad_entries_and_ignores_extra_fields() {
        let root = tempfile::tempdir().expect("tempdir");
        let source = JsonUserSource::in_workspace(root.path());
        fs::create_dir_all(source.path().parent().expect("parent")).expect("mkdir");
        fs::write(
            source.path(),
            r#"[
                {"username": "kim", "name": "Kim", "email": "kim@x.io", "role": "sponsor",
                 "password": "hunter2", "joinedAt": "2024-01-01"},
                {"username": "lee", "role": "janitor"}
            ]"#,
        )
        .expect("write");

        let users = source.load_users().expect("load");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "kim");
        assert_eq!(users[0].role, UserRole::Sponsor);
    }
}
