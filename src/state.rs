use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ClientError;
use crate::models::{Role, SessionUser};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::{fs, io};
use tracing::{debug, warn};

/// Key the session record is stored under.
pub const SESSION_KEY: &str = "user";

/// Client-side key/value storage backed by one JSON object on disk. Holds the
/// logged-in user under [`SESSION_KEY`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(err) => {
                warn!("failed to read session storage {}: {}", self.path.display(), err);
                return Map::new();
            }
        };
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => map,
            Err(err) => {
                warn!("failed to parse session storage {}: {}", self.path.display(), err);
                Map::new()
            }
        }
    }

    fn persist(&self, map: &Map<String, Value>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        Ok(())
    }

    pub fn save(&self, user: &SessionUser) -> Result<(), ClientError> {
        let mut map = self.load();
        map.insert(SESSION_KEY.to_string(), serde_json::to_value(user)?);
        self.persist(&map)?;
        debug!(user_id = user.id, role = %user.role, "session saved");
        Ok(())
    }

    pub fn current(&self) -> Option<SessionUser> {
        let value = self.load().remove(SESSION_KEY)?;
        match serde_json::from_value(value) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("ignoring malformed session record: {}", err);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        let mut map = self.load();
        if map.remove(SESSION_KEY).is_some() {
            self.persist(&map)?;
        }
        Ok(())
    }

    /// Returns the session user when it has `role`. `None` means the caller
    /// must go back to the entry page.
    pub fn require_role(&self, role: Role) -> Option<SessionUser> {
        match self.current() {
            Some(user) if user.role == role => Some(user),
            Some(user) => {
                debug!(user_id = user.id, expected = %role, actual = %user.role, "role mismatch");
                None
            }
            None => None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let api = ApiClient::new(config.api_url.clone());
        let sessions = SessionStore::new(config.session_path.clone());
        Self { config, api, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir()
            .join(format!("quiz_client_state_{}_{}", name, std::process::id()))
            .join("session.json");
        let _ = fs::remove_file(&path);
        SessionStore::new(path)
    }

    fn student() -> SessionUser {
        SessionUser {
            id: 3,
            username: "ivan".into(),
            role: Role::Student,
        }
    }

    #[test]
    fn save_current_clear() {
        let store = temp_store("roundtrip");
        assert!(store.current().is_none());
        store.save(&student()).unwrap();
        assert_eq!(store.current(), Some(student()));
        store.clear().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn require_role_checks_role() {
        let store = temp_store("roles");
        assert!(store.require_role(Role::Student).is_none());
        store.save(&student()).unwrap();
        assert_eq!(store.require_role(Role::Student).map(|u| u.id), Some(3));
        assert!(store.require_role(Role::Teacher).is_none());
    }

    #[test]
    fn malformed_record_counts_as_absent() {
        let store = temp_store("malformed");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"user": {"id": "x"}}"#).unwrap();
        assert!(store.current().is_none());
        fs::write(store.path(), "not json").unwrap();
        assert!(store.current().is_none());
        store.save(&student()).unwrap();
        assert_eq!(store.current(), Some(student()));
    }

    #[test]
    fn clear_keeps_other_keys() {
        let store = temp_store("other_keys");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"theme": "dark"}"#).unwrap();
        store.save(&student()).unwrap();
        store.clear().unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("ivan"));
    }
}
