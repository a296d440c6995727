use std::fs;
use std::path::PathBuf;

use super::error::AuthError;
use super::session::AuthSession;

/// Remembers the last signed-in user's tokens between runs.
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Option<AuthSession> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("Failed to read session cache {}: {err}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(err) => {
                log::warn!("Discarding unreadable session cache: {err}");
                None
            }
        }
    }

    pub fn store(&self, session: &AuthSession) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| AuthError::Cache(err.to_string()))?;
            }
        }
        let json =
            serde_json::to_string_pretty(session).map_err(|err| AuthError::Cache(err.to_string()))?;
        fs::write(&self.path, json).map_err(|err| AuthError::Cache(err.to_string()))
    }

    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("Failed to remove session cache: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::test_support::valid_session;

    #[test]
    fn store_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("auth").join("session.json"));
        assert!(cache.load().is_none());

        let session = valid_session("a@b.c");
        cache.store(&session).unwrap();
        assert_eq!(cache.load(), Some(session));

        cache.clear();
        assert!(cache.load().is_none());
        cache.clear();
    }

    #[test]
    fn unreadable_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "garbage").unwrap();

        assert!(SessionCache::new(path).load().is_none());
    }
}
