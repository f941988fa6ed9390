//! Current Session
//!
//! Process-wide logged-in user, shared between the HTTP gateway (for the
//! `Authorization` header) and the CLI. Login stores the user and, when a
//! backing file is configured, remembers it across runs; logout forgets it.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::models::User;

/// Shared handle on the current session
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Arc<RwLock<Option<User>>>,
    file: Option<PathBuf>,
}

impl Session {
    /// A logged-out session that is never persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restore the remembered user from `path`, if any
    ///
    /// A missing file yields a logged-out session bound to that path.
    pub fn restore(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let user = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let user: User = serde_json::from_str(&content).map_err(|e| SessionError::Corrupt {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
                tracing::debug!(login = %user.login, "Restored remembered user");
                Some(user)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(SessionError::Io { path, error: e }),
        };

        Ok(Self {
            user: Arc::new(RwLock::new(user)),
            file: Some(path),
        })
    }

    /// Store the logged-in user and remember it
    pub fn login(&self, user: User) -> Result<(), SessionError> {
        if let Some(path) = &self.file {
            write_user(path, &user)?;
        }
        tracing::info!(login = %user.login, "User logged in");
        *self.user.write() = Some(user);
        Ok(())
    }

    /// Forget the logged-in user
    pub fn logout(&self) -> Result<(), SessionError> {
        let previous = self.user.write().take();
        if let Some(path) = &self.file {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(SessionError::Io {
                        path: path.clone(),
                        error: e,
                    })
                }
            }
        }
        if let Some(user) = previous {
            tracing::info!(login = %user.login, "User logged out");
        }
        Ok(())
    }

    /// The logged-in user, if any
    pub fn current(&self) -> Option<User> {
        self.user.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.read().is_some()
    }

    /// Token to send as `Authorization: Bearer ...`
    pub fn bearer_token(&self) -> Option<String> {
        self.user.read().as_ref().and_then(|u| u.token.clone())
    }

    /// Backing file, if the session is remembered
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

fn write_user(path: &Path, user: &User) -> Result<(), SessionError> {
    let io_err = |error| SessionError::Io {
        path: path.to_path_buf(),
        error,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_json::to_string(user).map_err(|e| SessionError::Corrupt {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(io_err)
}

/// Session persistence errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file {path:?}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Corrupt session file {path:?}: {error}")]
    Corrupt { path: PathBuf, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cedric() -> User {
        User {
            id: Some(1),
            login: "cedric".to_string(),
            birth_year: Some(1986),
            money: Some(1000),
            registration_instant: None,
            token: Some("secret-token".to_string()),
        }
    }

    #[test]
    fn test_login_is_remembered() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ponyracer").join("remember_me.json");

        let session = Session::restore(&path).unwrap();
        assert!(!session.is_logged_in());

        session.login(cedric()).unwrap();
        assert_eq!(session.bearer_token().as_deref(), Some("secret-token"));

        let restored = Session::restore(&path).unwrap();
        assert_eq!(restored.current(), Some(cedric()));
    }

    #[test]
    fn test_logout_forgets_user() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remember_me.json");

        let session = Session::restore(&path).unwrap();
        session.login(cedric()).unwrap();
        session.logout().unwrap();

        assert!(session.current().is_none());
        assert!(session.bearer_token().is_none());
        assert!(!path.exists());

        // logging out twice is fine
        session.logout().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remember_me.json");
        std::fs::write(&path, "not json").unwrap();

        let result = Session::restore(&path);
        assert!(matches!(result, Err(SessionError::Corrupt { .. })));
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::in_memory();
        let other = session.clone();

        session.login(cedric()).unwrap();
        assert!(other.is_logged_in());
        assert!(other.file().is_none());
    }
}
