//! crates/site_core/src/session.rs
//!
//! Remembers a successful admin login for a limited time, surviving restarts
//! through a `SessionStorage` port.
//!
//! The store is an explicit service object: it starts in `AuthState::Loading`,
//! moves to `Authenticated` or `Unauthenticated` on `init`, and never goes
//! back to `Loading`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::domain::AdminUser;
use crate::ports::{CredentialVerifier, PortResult, SessionStorage};

pub const AUTH_KEY: &str = "site-auth";
pub const USER_KEY: &str = "site-user";
pub const TIMESTAMP_KEY: &str = "site-timestamp";

/// How long a login is remembered.
pub fn default_ttl() -> Duration {
    Duration::hours(24)
}

/// The persisted proof of a prior successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub authenticated: bool,
    pub user: AdminUser,
    pub issued_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user: AdminUser, issued_at: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            user,
            issued_at,
        }
    }

    /// A record is valid only while `now - issued_at < ttl`.
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.authenticated && now.signed_duration_since(self.issued_at) < ttl
    }

    /// Reads the three storage keys. Missing or malformed data yields `None`.
    fn load(storage: &dyn SessionStorage) -> Option<Self> {
        if storage.get(AUTH_KEY)? != "true" {
            return None;
        }
        let user: AdminUser = serde_json::from_str(&storage.get(USER_KEY)?).ok()?;
        let millis: i64 = storage.get(TIMESTAMP_KEY)?.trim().parse().ok()?;
        let issued_at = Utc.timestamp_millis_opt(millis).single()?;
        Some(Self::new(user, issued_at))
    }

    fn save(&self, storage: &mut dyn SessionStorage) -> PortResult<()> {
        let user = serde_json::to_string(&self.user)
            .map_err(|e| crate::ports::PortError::Unexpected(e.to_string()))?;
        storage.set(AUTH_KEY, if self.authenticated { "true" } else { "false" })?;
        storage.set(USER_KEY, &user)?;
        storage.set(TIMESTAMP_KEY, &self.issued_at.timestamp_millis().to_string())?;
        Ok(())
    }
}

/// The tri-state consumers gate protected views on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated(AdminUser),
    Unauthenticated,
}

pub struct SessionStore<S: SessionStorage> {
    storage: S,
    ttl: Duration,
    state: AuthState,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S, ttl: Duration) -> Self {
        Self {
            storage,
            ttl,
            state: AuthState::Loading,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&AdminUser> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// For callers keeping extra keys next to the session record.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Restores a stored session if it is still valid, otherwise clears storage.
    pub fn init(&mut self, now: DateTime<Utc>) -> &AuthState {
        if self.state != AuthState::Loading {
            return &self.state;
        }

        match SessionRecord::load(&self.storage) {
            Some(record) if record.is_valid(now, self.ttl) => {
                info!("Restored admin session for {}", record.user.username);
                self.state = AuthState::Authenticated(record.user);
            }
            Some(_) => {
                info!("Stored admin session expired, clearing it.");
                self.clear_storage();
                self.state = AuthState::Unauthenticated;
            }
            None => {
                self.clear_storage();
                self.state = AuthState::Unauthenticated;
            }
        }
        &self.state
    }

    /// Checks the credentials and, on success, persists and activates the session.
    ///
    /// Never fails: verifier or storage errors are logged and reported as `false`.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        verifier: &dyn CredentialVerifier,
        now: DateTime<Utc>,
    ) -> bool {
        let user = match verifier.verify(username, password).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!("Login rejected for {}", username);
                return false;
            }
            Err(e) => {
                error!("Login error for {}: {:?}", username, e);
                return false;
            }
        };

        self.establish(user, now)
    }

    /// Persists a session for a user whose credentials were checked elsewhere.
    pub fn establish(&mut self, user: AdminUser, now: DateTime<Utc>) -> bool {
        let record = SessionRecord::new(user, now);
        if let Err(e) = record.save(&mut self.storage) {
            error!("Failed to persist admin session: {:?}", e);
            self.clear_storage();
            return false;
        }
        info!("Login successful for {}", record.user.username);
        self.state = AuthState::Authenticated(record.user);
        true
    }

    pub fn logout(&mut self) {
        self.state = AuthState::Unauthenticated;
        self.clear_storage();
    }

    /// Drops the in-memory state; the stored record is left for the next start.
    pub fn dispose(&mut self) {
        self.state = AuthState::Unauthenticated;
    }

    fn clear_storage(&mut self) {
        for key in [AUTH_KEY, USER_KEY, TIMESTAMP_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to remove {} from session storage: {:?}", key, e);
            }
        }
    }
}

/// Process-local `SessionStorage`, mainly for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> PortResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PortResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use async_trait::async_trait;

    struct FixedVerifier;

    #[async_trait]
    impl CredentialVerifier for FixedVerifier {
        async fn verify(&self, username: &str, password: &str) -> PortResult<Option<AdminUser>> {
            match (username, password) {
                ("admin", "secret") => Ok(Some(AdminUser {
                    username: "admin".into(),
                })),
                ("broken", _) => Err(PortError::Unexpected("db down".into())),
                _ => Ok(None),
            }
        }
    }

    fn stored(issued_at: DateTime<Utc>) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        SessionRecord::new(AdminUser { username: "admin".into() }, issued_at)
            .save(&mut storage)
            .unwrap();
        storage
    }

    #[test]
    fn expired_session_is_cleared() {
        let now = Utc::now();
        let mut store = SessionStore::new(stored(now - Duration::hours(25)), default_ttl());
        assert_eq!(store.state(), &AuthState::Loading);
        assert_eq!(store.init(now), &AuthState::Unauthenticated);
        assert!(store.storage().is_empty());
    }

    #[test]
    fn recent_session_is_restored() {
        let now = Utc::now();
        let mut store = SessionStore::new(stored(now - Duration::hours(1)), default_ttl());
        store.init(now);
        assert_eq!(store.user().map(|u| u.username.as_str()), Some("admin"));
    }

    #[test]
    fn session_exactly_at_ttl_is_expired() {
        let now = Utc::now();
        let record = SessionRecord::new(AdminUser { username: "a".into() }, now - default_ttl());
        assert!(!record.is_valid(now, default_ttl()));
    }

    #[test]
    fn malformed_storage_is_treated_as_absent() {
        let mut storage = stored(Utc::now());
        storage.set(USER_KEY, "{not json").unwrap();
        let mut store = SessionStore::new(storage, default_ttl());
        assert_eq!(store.init(Utc::now()), &AuthState::Unauthenticated);
        assert!(store.storage().is_empty());

        let mut storage = stored(Utc::now());
        storage.set(TIMESTAMP_KEY, "yesterday").unwrap();
        let mut store = SessionStore::new(storage, default_ttl());
        assert_eq!(store.init(Utc::now()), &AuthState::Unauthenticated);
    }

    #[test]
    fn init_runs_only_once() {
        let now = Utc::now();
        let mut store = SessionStore::new(MemoryStorage::new(), default_ttl());
        store.init(now);
        store.establish(AdminUser { username: "admin".into() }, now);
        assert!(store.is_authenticated());
        store.init(now);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn login_persists_and_logout_clears() {
        let now = Utc::now();
        let mut store = SessionStore::new(MemoryStorage::new(), default_ttl());
        store.init(now);

        assert!(!store.login("admin", "wrong", &FixedVerifier, now).await);
        assert!(!store.login("broken", "x", &FixedVerifier, now).await);
        assert_eq!(store.state(), &AuthState::Unauthenticated);

        assert!(store.login("admin", "secret", &FixedVerifier, now).await);
        assert!(store.is_authenticated());
        assert_eq!(store.storage().get(AUTH_KEY).as_deref(), Some("true"));

        store.logout();
        assert_eq!(store.state(), &AuthState::Unauthenticated);
        assert!(store.storage().is_empty());
    }

    #[tokio::test]
    async fn dispose_keeps_storage_for_next_start() {
        let now = Utc::now();
        let mut store = SessionStore::new(MemoryStorage::new(), default_ttl());
        store.init(now);
        assert!(store.login("admin", "secret", &FixedVerifier, now).await);
        store.dispose();
        assert!(!store.is_authenticated());

        let storage = store.storage().clone();
        let mut next = SessionStore::new(storage, default_ttl());
        next.init(now + Duration::minutes(5));
        assert!(next.is_authenticated());
    }
}
