use std::sync::Arc;

use shopgate_core::{StoreResult, SubjectId};

use crate::{CredentialRecord, NewCredential};

/// Credential store collaborator.
///
/// `create` must reject a duplicate email with `StoreError::Conflict`.
/// `update_password` and `delete` report an unknown subject as
/// `StoreError::NotFound`.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>>;
    fn find_by_id(&self, subject_id: SubjectId) -> StoreResult<Option<CredentialRecord>>;
    fn create(&self, credential: NewCredential) -> StoreResult<SubjectId>;
    fn update_password(&self, subject_id: SubjectId, password_hash: String) -> StoreResult<()>;
    fn delete(&self, subject_id: SubjectId) -> StoreResult<()>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>> {
        (**self).find_by_email(email)
    }

    fn find_by_id(&self, subject_id: SubjectId) -> StoreResult<Option<CredentialRecord>> {
        (**self).find_by_id(subject_id)
    }

    fn create(&self, credential: NewCredential) -> StoreResult<SubjectId> {
        (**self).create(credential)
    }

    fn update_password(&self, subject_id: SubjectId, password_hash: String) -> StoreResult<()> {
        (**self).update_password(subject_id, password_hash)
    }

    fn delete(&self, subject_id: SubjectId) -> StoreResult<()> {
        (**self).delete(subject_id)
    }
}
