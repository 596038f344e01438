//! services/api/src/adapters/file_storage.rs
//!
//! A `SessionStorage` kept in a small JSON file, so the admin CLI's session
//! survives between invocations.

use site_core::ports::{PortError, PortResult, SessionStorage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the file at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed session file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// `$CONFIG_DIR/site-admin/session.json`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("site-admin")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        write_private(&self.path, text.as_bytes()).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

/// The file holds a server session token, so it is kept owner-only on unix.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> PortResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> PortResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use site_core::domain::AdminUser;
    use site_core::session::{default_ttl, SessionStore};

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut storage = FileStorage::open(&path);
        storage.set("site-auth", "true").unwrap();

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("site-auth").as_deref(), Some("true"));
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::open(&path);
        assert!(storage.get("site-auth").is_none());
    }

    #[test]
    fn session_store_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let now = Utc::now();

        let mut store = SessionStore::new(FileStorage::open(&path), default_ttl());
        store.init(now);
        assert!(store.establish(AdminUser { username: "admin".into() }, now));

        let mut next = SessionStore::new(FileStorage::open(&path), default_ttl());
        next.init(now + Duration::hours(2));
        assert_eq!(next.user().map(|u| u.username.as_str()), Some("admin"));

        let mut expired = SessionStore::new(FileStorage::open(&path), default_ttl());
        expired.init(now + Duration::hours(25));
        assert!(!expired.is_authenticated());
        assert!(FileStorage::open(&path).get("site-auth").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut storage = FileStorage::open(&path);
        storage.set("site-token", "abc123").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
