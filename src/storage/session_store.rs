//! Persistent session store. Holds the staged login email between "OTP requested"
//! and "OTP verified", and the authenticated `Session` afterwards. The session is
//! written and cleared as one record; a stored value that does not decode is the
//! same as no session.

use super::{Storage, StorageError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::debug;

pub const USER_DATA_KEY: &str = "userData";
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const LOGIN_EMAIL_KEY: &str = "loginEmail";

/// Authenticated identity created by OTP verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub manager_id: String,
    pub manager_name: String,
    pub manager_email: String,
    pub ref_code: String,
}

impl Session {
    #[must_use]
    pub fn auth_token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("manager_id", &self.manager_id)
            .field("manager_name", &self.manager_name)
            .field("manager_email", &self.manager_email)
            .field("ref_code", &self.ref_code)
            .finish()
    }
}

/// Decodes a persisted session. Never fails: anything unusable is `None`.
#[must_use]
pub fn decode_session(raw: &str) -> Option<Session> {
    let session: Session = serde_json::from_str(raw).ok()?;
    if session.token.trim().is_empty() || session.manager_id.trim().is_empty() {
        return None;
    }
    Some(session)
}

/// Read-through access to the persisted login state. Cloning shares the backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// # Errors
    /// Returns an error if the email can not be persisted.
    pub fn save_login_email(&self, email: &str) -> Result<(), StorageError> {
        self.storage.set_item(LOGIN_EMAIL_KEY, email)
    }

    #[must_use]
    pub fn read_login_email(&self) -> Option<String> {
        self.storage
            .get_item(LOGIN_EMAIL_KEY)
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
    }

    /// # Errors
    /// Returns an error if the removal can not be persisted.
    pub fn clear_login_email(&self) -> Result<(), StorageError> {
        self.storage.remove_item(LOGIN_EMAIL_KEY)
    }

    /// Replaces the whole session record.
    ///
    /// # Errors
    /// Returns an error if the session can not be encoded or persisted.
    pub fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(session)?;
        // Record and token mirror land in one update.
        self.storage.set_items(&[
            (USER_DATA_KEY, encoded.as_str()),
            (AUTH_TOKEN_KEY, session.token.as_str()),
        ])?;
        debug!(manager_id = %session.manager_id, "session saved");
        Ok(())
    }

    #[must_use]
    pub fn read_session(&self) -> Option<Session> {
        self.storage
            .get_item(USER_DATA_KEY)
            .and_then(|raw| decode_session(&raw))
    }

    /// # Errors
    /// Returns an error if the removal can not be persisted.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.storage.remove_items(&[USER_DATA_KEY, AUTH_TOKEN_KEY])?;
        debug!("session cleared");
        Ok(())
    }

    /// Token of the current session, evaluated now.
    #[must_use]
    pub fn read_auth_token(&self) -> Option<SecretString> {
        self.read_session().map(|session| session.auth_token())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_session().is_some()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use secrecy::ExposeSecret;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::new()))
    }

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            manager_id: "m1".to_string(),
            manager_name: "A".to_string(),
            manager_email: "a@x.com".to_string(),
            ref_code: "R1".to_string(),
        }
    }

    #[test]
    fn login_email_lifecycle() {
        let store = store();
        assert_eq!(store.read_login_email(), None);
        store.save_login_email("a@x.com").unwrap();
        assert_eq!(store.read_login_email().as_deref(), Some("a@x.com"));
        store.clear_login_email().unwrap();
        assert_eq!(store.read_login_email(), None);
    }

    #[test]
    fn blank_login_email_is_absent() {
        let store = store();
        store.save_login_email("   ").unwrap();
        assert_eq!(store.read_login_email(), None);
    }

    #[test]
    fn auth_token_reflects_latest_save_immediately() {
        let store = store();
        assert!(store.read_auth_token().is_none());

        store.save_session(&session("tok1")).unwrap();
        assert_eq!(store.read_auth_token().unwrap().expose_secret(), "tok1");

        store.save_session(&session("tok2")).unwrap();
        assert_eq!(store.read_auth_token().unwrap().expose_secret(), "tok2");
    }

    /// Counts write calls so a session save can be checked for atomicity.
    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        writes: std::sync::atomic::AtomicUsize,
    }

    impl Storage for CountingStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.remove_item(key)
        }

        fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.set_items(entries)
        }
    }

    #[test]
    fn save_session_writes_record_and_token_in_one_update() {
        let storage = Arc::new(CountingStorage::default());
        let store = SessionStore::new(storage.clone());
        store.save_session(&session("tok1")).unwrap();

        assert_eq!(storage.writes.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(storage.get_item(AUTH_TOKEN_KEY).as_deref(), Some("tok1"));
        assert!(storage.get_item(USER_DATA_KEY).is_some());
    }

    #[test]
    fn clear_session_removes_record_and_token() {
        let store = store();
        store.save_session(&session("tok1")).unwrap();
        assert!(store.is_authenticated());
        store.clear_session().unwrap();
        assert!(!store.is_authenticated());
        assert!(store.read_auth_token().is_none());
        assert_eq!(store.storage.get_item(AUTH_TOKEN_KEY), None);
    }

    #[test]
    fn corrupt_session_is_treated_as_absent() {
        let store = store();
        store.storage.set_item(USER_DATA_KEY, "{\"token\":").unwrap();
        assert_eq!(store.read_session(), None);
        assert!(store.read_auth_token().is_none());
    }

    #[test]
    fn decode_session_rejects_empty_token_or_id() {
        assert!(decode_session("null").is_none());
        assert!(decode_session(
            r#"{"token":"","managerId":"m1","managerName":"A","managerEmail":"a@x.com","refCode":"R1"}"#
        )
        .is_none());
        assert!(decode_session(
            r#"{"token":"t","managerId":" ","managerName":"A","managerEmail":"a@x.com","refCode":"R1"}"#
        )
        .is_none());
        assert_eq!(
            decode_session(
                r#"{"token":"t","managerId":"m1","managerName":"A","managerEmail":"a@x.com","refCode":"R1"}"#
            ),
            Some(session("t"))
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", session("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
