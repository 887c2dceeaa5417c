//! User directory: credentials and public profiles kept side by side.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use shopgate_auth::{CredentialRecord, CredentialStore, NewCredential, UserProfile};
use shopgate_core::{DomainError, StoreError, StoreResult, SubjectId};

use crate::RecordError;

#[derive(Debug, Clone)]
struct Account {
    credential: CredentialRecord,
    profile: UserProfile,
}

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<SubjectId, Account>,
    by_email: HashMap<String, SubjectId>,
}

/// In-memory user directory.
///
/// Emails are unique: the email index and the account map change under one
/// write guard.
#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<Accounts>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, subject_id: SubjectId) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .read()?
            .by_id
            .get(&subject_id)
            .map(|a| a.profile.clone()))
    }

    /// All profiles, oldest first.
    pub fn profiles(&self) -> StoreResult<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self
            .read()?
            .by_id
            .values()
            .map(|a| a.profile.clone())
            .collect();
        profiles.sort_by_key(|p| (p.created_at, p.id));
        Ok(profiles)
    }

    pub fn rename(
        &self,
        subject_id: SubjectId,
        fullname: &str,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, RecordError> {
        let fullname = fullname.trim();
        if fullname.is_empty() {
            return Err(DomainError::validation("fullname must not be blank").into());
        }

        let mut accounts = self.write()?;
        let account = accounts
            .by_id
            .get_mut(&subject_id)
            .ok_or(StoreError::NotFound)?;
        account.profile.fullname = fullname.to_string();
        account.profile.updated_at = now;
        Ok(account.profile.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Accounts>> {
        self.inner
            .read()
            .map_err(|_| StoreError::unavailable("user directory lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Accounts>> {
        self.inner
            .write()
            .map_err(|_| StoreError::unavailable("user directory lock poisoned"))
    }
}

impl CredentialStore for UserDirectory {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>> {
        let accounts = self.read()?;
        Ok(accounts
            .by_email
            .get(email)
            .and_then(|id| accounts.by_id.get(id))
            .map(|a| a.credential.clone()))
    }

    fn find_by_id(&self, subject_id: SubjectId) -> StoreResult<Option<CredentialRecord>> {
        Ok(self
            .read()?
            .by_id
            .get(&subject_id)
            .map(|a| a.credential.clone()))
    }

    fn create(&self, credential: NewCredential) -> StoreResult<SubjectId> {
        let mut accounts = self.write()?;
        if accounts.by_email.contains_key(&credential.email) {
            return Err(StoreError::conflict("email already registered"));
        }

        let subject_id = SubjectId::new();
        let now = Utc::now();
        let account = Account {
            credential: CredentialRecord {
                subject_id,
                email: credential.email.clone(),
                password_hash: credential.password_hash,
                role: credential.role,
            },
            profile: UserProfile {
                id: subject_id,
                fullname: credential.fullname,
                email: credential.email.clone(),
                role: credential.role,
                created_at: now,
                updated_at: now,
            },
        };
        accounts.by_email.insert(credential.email, subject_id);
        accounts.by_id.insert(subject_id, account);
        tracing::debug!(%subject_id, role = %credential.role, "account created");
        Ok(subject_id)
    }

    fn update_password(&self, subject_id: SubjectId, password_hash: String) -> StoreResult<()> {
        let mut accounts = self.write()?;
        let account = accounts
            .by_id
            .get_mut(&subject_id)
            .ok_or(StoreError::NotFound)?;
        account.credential.password_hash = password_hash;
        account.profile.updated_at = Utc::now();
        Ok(())
    }

    /// Removes the credential and the profile together.
    fn delete(&self, subject_id: SubjectId) -> StoreResult<()> {
        let mut accounts = self.write()?;
        let account = accounts
            .by_id
            .remove(&subject_id)
            .ok_or(StoreError::NotFound)?;
        accounts.by_email.remove(&account.credential.email);
        tracing::debug!(%subject_id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopgate_auth::Role;

    fn new_credential(email: &str) -> NewCredential {
        NewCredential {
            email: email.to_string(),
            fullname: "Alice Smith".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Standard,
        }
    }

    #[test]
    fn created_account_is_findable_both_ways() {
        let dir = UserDirectory::new();
        let id = dir.create(new_credential("alice@example.com")).unwrap();

        let by_email = dir.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.subject_id, id);
        assert_eq!(dir.find_by_id(id).unwrap(), Some(by_email));

        let profile = dir.profile(id).unwrap().unwrap();
        assert_eq!(profile.fullname, "Alice Smith");
        assert_eq!(profile.role, Role::Standard);
    }

    #[test]
    fn duplicate_email_conflicts() {
        let dir = UserDirectory::new();
        dir.create(new_credential("alice@example.com")).unwrap();
        let err = dir.create(new_credential("alice@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(dir.profiles().unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_profile_and_frees_email() {
        let dir = UserDirectory::new();
        let id = dir.create(new_credential("alice@example.com")).unwrap();

        dir.delete(id).unwrap();
        assert_eq!(dir.profile(id).unwrap(), None);
        assert_eq!(dir.find_by_email("alice@example.com").unwrap(), None);
        assert_eq!(dir.delete(id).unwrap_err(), StoreError::NotFound);

        dir.create(new_credential("alice@example.com")).unwrap();
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let dir = UserDirectory::new();
        let id = dir.create(new_credential("alice@example.com")).unwrap();

        let renamed = dir.rename(id, "  Alice Jones ", Utc::now()).unwrap();
        assert_eq!(renamed.fullname, "Alice Jones");

        let err = dir.rename(id, "   ", Utc::now()).unwrap_err();
        assert!(matches!(err, RecordError::Domain(_)));

        let err = dir.rename(SubjectId::new(), "Bob", Utc::now()).unwrap_err();
        assert_eq!(err, RecordError::Store(StoreError::NotFound));
    }

    #[test]
    fn password_update_replaces_hash() {
        let dir = UserDirectory::new();
        let id = dir.create(new_credential("alice@example.com")).unwrap();
        dir.update_password(id, "$argon2id$new".to_string()).unwrap();
        assert_eq!(
            dir.find_by_id(id).unwrap().unwrap().password_hash,
            "$argon2id$new"
        );
        assert_eq!(
            dir.update_password(SubjectId::new(), String::new()).unwrap_err(),
            StoreError::NotFound
        );
    }
}
