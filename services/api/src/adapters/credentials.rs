//! services/api/src/adapters/credentials.rs
//!
//! Admin password hashing and the store-backed `CredentialVerifier`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use site_core::domain::AdminUser;
use site_core::ports::{ContentStore, CredentialVerifier, PortError, PortResult};
use std::sync::Arc;
use tracing::error;

/// Hashes a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

/// Looks the admin up by username and checks the password against the stored hash.
pub struct Argon2Verifier {
    store: Arc<dyn ContentStore>,
}

impl Argon2Verifier {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialVerifier for Argon2Verifier {
    async fn verify(&self, username: &str, password: &str) -> PortResult<Option<AdminUser>> {
        let credentials = match self.store.get_admin_credentials(username).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let parsed_hash = PasswordHash::new(&credentials.password_hash).map_err(|e| {
            error!("Failed to parse password hash for {}: {:?}", username, e);
            PortError::Unexpected("Stored password hash is malformed".to_string())
        })?;

        let valid = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();

        Ok(valid.then(|| AdminUser {
            username: credentials.username,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryContentStore;
    use site_core::domain::AdminCredentials;

    #[tokio::test]
    async fn verifies_hashed_password() {
        let store = Arc::new(MemoryContentStore::new());
        store
            .upsert_admin_credentials(AdminCredentials {
                username: "admin".into(),
                password_hash: hash_password("s3cret").unwrap(),
            })
            .await
            .unwrap();

        let verifier = Argon2Verifier::new(store);
        let user = verifier.verify("admin", "s3cret").await.unwrap();
        assert_eq!(user.unwrap().username, "admin");
        assert!(verifier.verify("admin", "wrong").await.unwrap().is_none());
        assert!(verifier.verify("ghost", "s3cret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn plaintext_stored_password_is_rejected() {
        let store = Arc::new(MemoryContentStore::new());
        store
            .upsert_admin_credentials(AdminCredentials {
                username: "admin".into(),
                password_hash: "s3cret".into(),
            })
            .await
            .unwrap();

        let verifier = Argon2Verifier::new(store);
        assert!(verifier.verify("admin", "s3cret").await.is_err());
    }
}
