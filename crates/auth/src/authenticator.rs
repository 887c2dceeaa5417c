//! Credential service: registration, login and password change.
//!
//! Hashing is CPU-bound; async callers should run these methods on a
//! blocking thread.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use shopgate_core::{StoreError, SubjectId};

use crate::{
    AuthError, CredentialStore, IssuedToken, LoginFailure, NewCredential, PasswordHasher, Role,
    TokenCodec, normalize_email,
};

/// Registration input (plaintext password; hashed before it reaches the store).
#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub fullname: String,
    pub password: String,
}

pub struct Authenticator<S> {
    store: S,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    decoy_hash: OnceLock<Option<String>>,
}

impl<S> Authenticator<S>
where
    S: CredentialStore,
{
    pub fn new(store: S, hasher: PasswordHasher, codec: Arc<TokenCodec>) -> Self {
        Self {
            store,
            hasher,
            codec,
            decoy_hash: OnceLock::new(),
        }
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }

    pub fn register(&self, registration: Registration) -> Result<SubjectId, AuthError> {
        self.create(registration, Role::Standard)
    }

    /// Ensure an admin credential exists for `email`.
    ///
    /// Returns the existing subject if the email is already registered; its
    /// role and password are left untouched.
    pub fn seed_admin(&self, email: &str, password: &str) -> Result<SubjectId, AuthError> {
        if let Some(existing) = self.store.find_by_email(&normalize_email(email))? {
            if !existing.role.is_admin() {
                tracing::warn!(
                    subject_id = %existing.subject_id,
                    "bootstrap admin email belongs to a standard account; leaving it unchanged"
                );
            }
            return Ok(existing.subject_id);
        }

        let subject_id = self.create(
            Registration {
                email: email.to_string(),
                fullname: "Administrator".to_string(),
                password: password.to_string(),
            },
            Role::Admin,
        )?;
        tracing::info!(%subject_id, "bootstrap admin created");
        Ok(subject_id)
    }

    /// Exchange email + password for a signed token.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let outcome = match self.store.find_by_email(&normalize_email(email))? {
            None => {
                self.burn_decoy(password);
                Err(LoginFailure::CredentialNotFound)
            }
            Some(record) if self.hasher.verify(password, &record.password_hash) => Ok(record),
            Some(_) => Err(LoginFailure::CredentialMismatch),
        };

        match outcome {
            Ok(record) => {
                let issued = self.codec.issue(record.subject_id, record.role, now)?;
                tracing::info!(subject_id = %record.subject_id, role = %record.role, "login succeeded");
                Ok(issued)
            }
            Err(failure) => {
                tracing::debug!(?failure, "login rejected");
                Err(AuthError::InvalidLogin)
            }
        }
    }

    /// Replace the password of `subject_id` after checking the current one.
    pub fn change_password(
        &self,
        subject_id: SubjectId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let record = self
            .store
            .find_by_id(subject_id)?
            .ok_or(AuthError::UnknownSubject)?;

        if !self.hasher.verify(current_password, &record.password_hash) {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.store
            .update_password(subject_id, password_hash)
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::UnknownSubject,
                other => AuthError::Store(other),
            })?;
        tracing::info!(%subject_id, "password changed");
        Ok(())
    }

    fn create(&self, registration: Registration, role: Role) -> Result<SubjectId, AuthError> {
        let password_hash = self.hasher.hash(&registration.password)?;
        self.store
            .create(NewCredential {
                email: normalize_email(&registration.email),
                fullname: registration.fullname,
                password_hash,
                role,
            })
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })
    }

    /// Spend a verification on an unknown email so both failure paths cost
    /// about the same.
    fn burn_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.hasher.hash("decoy-password-never-matches").ok());
        if let Some(decoy) = decoy {
            let _ = self.hasher.verify(password, decoy);
        }
    }
}

impl<S> core::fmt::Debug for Authenticator<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator")
            .field("hasher", &self.hasher)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};
    use secrecy::SecretString;
    use shopgate_core::StoreResult;

    use crate::{CredentialRecord, HashingCost, SigningKey, TokenVerifier};

    #[derive(Default)]
    struct MemoryCredentials {
        records: Mutex<Vec<CredentialRecord>>,
    }

    impl CredentialStore for MemoryCredentials {
        fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>> {
            let records = self.records.lock().unwrap();
            Ok(records.iter().find(|r| r.email == email).cloned())
        }

        fn find_by_id(&self, subject_id: SubjectId) -> StoreResult<Option<CredentialRecord>> {
            let records = self.records.lock().unwrap();
            Ok(records.iter().find(|r| r.subject_id == subject_id).cloned())
        }

        fn create(&self, credential: NewCredential) -> StoreResult<SubjectId> {
            let mut records = self.records.lock().unwrap();
            if records.iter().any(|r| r.email == credential.email) {
                return Err(StoreError::conflict("email"));
            }
            let subject_id = SubjectId::new();
            records.push(CredentialRecord {
                subject_id,
                email: credential.email,
                password_hash: credential.password_hash,
                role: credential.role,
            });
            Ok(subject_id)
        }

        fn update_password(&self, subject_id: SubjectId, password_hash: String) -> StoreResult<()> {
            let mut records = self.records.lock().unwrap();
            let record = records
                .iter_mut()
                .find(|r| r.subject_id == subject_id)
                .ok_or(StoreError::NotFound)?;
            record.password_hash = password_hash;
            Ok(())
        }

        fn delete(&self, subject_id: SubjectId) -> StoreResult<()> {
            let mut records = self.records.lock().unwrap();
            records.retain(|r| r.subject_id != subject_id);
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn setup() -> (Authenticator<MemoryCredentials>, Arc<TokenCodec>) {
        let key = SigningKey::new(SecretString::from(
            "authenticator-test-secret-0123456789abcdef".to_string(),
        ))
        .unwrap();
        let codec = Arc::new(TokenCodec::new(&key, Duration::days(3)).unwrap());
        let hasher = PasswordHasher::new(HashingCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        (
            Authenticator::new(MemoryCredentials::default(), hasher, codec.clone()),
            codec,
        )
    }

    fn alice() -> Registration {
        Registration {
            email: "alice@example.com".to_string(),
            fullname: "Alice Smith".to_string(),
            password: "wonderland".to_string(),
        }
    }

    #[test]
    fn registered_user_logs_in_and_token_names_them() {
        let (auth, codec) = setup();
        let alice_id = auth.register(alice()).unwrap();

        let issued = auth.login("alice@example.com", "wonderland", now()).unwrap();
        let identity = codec.verify(&issued.token, now()).unwrap();

        assert_eq!(identity.subject_id, alice_id);
        assert_eq!(identity.role, Role::Standard);
    }

    #[test]
    fn stored_hash_is_not_the_plaintext() {
        let (auth, _) = setup();
        let id = auth.register(alice()).unwrap();
        let record = auth.store().find_by_id(id).unwrap().unwrap();
        assert_ne!(record.password_hash, "wonderland");
    }

    #[test]
    fn unknown_email_and_wrong_password_look_the_same() {
        let (auth, _) = setup();
        auth.register(alice()).unwrap();

        let unknown = auth.login("bob@example.com", "wonderland", now()).unwrap_err();
        let wrong = auth.login("alice@example.com", "looking-glass", now()).unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidLogin));
        assert!(matches!(wrong, AuthError::InvalidLogin));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn login_email_is_case_insensitive() {
        let (auth, _) = setup();
        auth.register(alice()).unwrap();
        assert!(auth.login(" ALICE@example.com", "wonderland", now()).is_ok());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (auth, _) = setup();
        auth.register(alice()).unwrap();
        let err = auth.register(alice()).unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn password_change_requires_current_password() {
        let (auth, _) = setup();
        let id = auth.register(alice()).unwrap();

        let err = auth.change_password(id, "not-it", "rabbit-hole").unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));

        auth.change_password(id, "wonderland", "rabbit-hole").unwrap();
        assert!(auth.login("alice@example.com", "wonderland", now()).is_err());
        assert!(auth.login("alice@example.com", "rabbit-hole", now()).is_ok());
    }

    #[test]
    fn password_change_for_unknown_subject_fails() {
        let (auth, _) = setup();
        let err = auth
            .change_password(SubjectId::new(), "a", "b")
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownSubject));
    }

    #[test]
    fn seeded_admin_gets_admin_tokens_and_seeding_is_idempotent() {
        let (auth, codec) = setup();
        let first = auth.seed_admin("root@example.com", "sup3r-user").unwrap();
        let second = auth.seed_admin("root@example.com", "other").unwrap();
        assert_eq!(first, second);

        let issued = auth.login("root@example.com", "sup3r-user", now()).unwrap();
        assert_eq!(codec.verify(&issued.token, now()).unwrap().role, Role::Admin);
    }
}
