//! Resource ownership reference.

use crate::SubjectId;

/// A protected resource that belongs to exactly one subject.
///
/// Orders report the subject that placed them. User profiles report themselves.
pub trait Owned {
    fn owner(&self) -> SubjectId;
}
