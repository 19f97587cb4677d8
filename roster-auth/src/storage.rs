//! Credential storage - persistence layer for the session
//!
//! Durable client-local key/value storage backing the session store. Two
//! entries live side by side in one directory: the opaque bearer token and
//! the JSON-serialized user record. They are always written together and
//! removed together; a lone entry is corrupted state.

use crate::session::User;
use roster_core::{ErrorContext, RosterError, RosterResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TOKEN_FILE: &str = "token";
const USER_FILE: &str = "user.json";

/// File-backed storage for the persisted session credentials
pub struct CredentialStorage {
    /// Directory holding the token and user entries
    dir: PathBuf,
}

impl CredentialStorage {
    /// Create a credential storage rooted at the given directory
    pub fn new<P: AsRef<Path>>(dir: P) -> RosterResult<Self> {
        let dir = dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&dir).map_err(|e| RosterError::Storage {
            message: format!("Failed to create credential directory: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("credential-storage")
                .with_operation("create_dir")
                .with_suggestion("Check directory permissions"),
        })?;

        info!("Credential storage initialized at: {}", dir.display());

        Ok(Self { dir })
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    /// Read the stored bearer token, if any. An empty file counts as absent.
    pub fn read_token(&self) -> Option<String> {
        let token = std::fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Read the stored user record.
    ///
    /// Returns `Ok(None)` when no record is stored; an unreadable or
    /// unparsable record is an error so the caller can treat it as
    /// corrupted state.
    pub fn read_user(&self) -> RosterResult<Option<User>> {
        let path = self.user_path();
        if !path.exists() {
            return Ok(None);
        }

        let json_data = std::fs::read_to_string(&path).map_err(|e| RosterError::Storage {
            message: format!("Failed to read user record: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("credential-storage").with_operation("read_user"),
        })?;

        let user: User = serde_json::from_str(&json_data).map_err(|e| RosterError::Storage {
            message: format!("Failed to parse user record: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("credential-storage")
                .with_operation("parse_user")
                .with_suggestion("Log in again to re-create the stored session"),
        })?;

        debug!("Loaded user record from {}", path.display());
        Ok(Some(user))
    }

    /// Write both entries together.
    ///
    /// If the second write fails the first is removed as well, so a
    /// half-written pair is never left behind.
    pub fn write(&self, user: &User, token: &str) -> RosterResult<()> {
        let json_data = serde_json::to_string_pretty(user).map_err(|e| RosterError::Storage {
            message: format!("Failed to serialize user record: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("credential-storage").with_operation("serialize_user"),
        })?;

        let write_pair = || -> std::io::Result<()> {
            std::fs::write(self.user_path(), &json_data)?;
            std::fs::write(self.token_path(), token)?;
            Ok(())
        };

        if let Err(e) = write_pair() {
            self.wipe();
            return Err(RosterError::Storage {
                message: format!("Failed to persist session: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("credential-storage")
                    .with_operation("write_pair")
                    .with_suggestion("Check disk space and directory permissions"),
            });
        }

        debug!("Persisted session credentials to {}", self.dir.display());
        Ok(())
    }

    /// Remove both entries. Absent entries are fine; other failures are
    /// logged and swallowed so callers on the logout path never fail.
    pub fn wipe(&self) {
        for path in [self.token_path(), self.user_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed credential file: {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "An".to_string(),
            email: Some("an@example.com".to_string()),
            roles: ["TRAINER".to_string()].into_iter().collect(),
            permissions: [Permission::EditTag].into_iter().collect(),
        }
    }

    #[test]
    fn write_then_read_round_trips_both_entries() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CredentialStorage::new(dir.path()).unwrap();

        storage.write(&sample_user(), "abc").unwrap();

        assert_eq!(storage.read_token().as_deref(), Some("abc"));
        let user = storage.read_user().unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "An");
    }

    #[test]
    fn absent_entries_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CredentialStorage::new(dir.path()).unwrap();

        assert!(storage.read_token().is_none());
        assert!(storage.read_user().unwrap().is_none());
    }

    #[test]
    fn malformed_user_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CredentialStorage::new(dir.path()).unwrap();

        std::fs::write(dir.path().join("user.json"), "{not json").unwrap();

        assert!(storage.read_user().is_err());
    }

    #[test]
    fn wipe_removes_both_entries_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CredentialStorage::new(dir.path()).unwrap();

        storage.write(&sample_user(), "abc").unwrap();
        storage.wipe();
        storage.wipe();

        assert!(storage.read_token().is_none());
        assert!(storage.read_user().unwrap().is_none());
    }

    #[test]
    fn minimal_user_record_deserializes_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CredentialStorage::new(dir.path()).unwrap();

        std::fs::write(
            dir.path().join("user.json"),
            r#"{"id":1,"name":"An","permissions":["EDIT_TAG"]}"#,
        )
        .unwrap();

        let user = storage.read_user().unwrap().unwrap();
        assert!(user.email.is_none());
        assert!(user.roles.is_empty());
        assert!(user.permissions.contains(&Permission::EditTag));
    }
}
