//! Access Decision Engine.
//!
//! - No IO
//! - No panics
//! - Total: every (identity, policy) pair yields `Allow` or `Deny`

use serde::Serialize;

use shopgate_core::SubjectId;

use crate::Identity;

/// Access policy attached to a protected operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Any verified identity.
    Authenticated,

    /// Only identities with the admin role.
    AdminOnly,

    /// The resource owner, or any admin.
    OwnerOrAdmin(SubjectId),
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Policy::Authenticated => f.write_str("authenticated"),
            Policy::AdminOnly => f.write_str("admin_only"),
            Policy::OwnerOrAdmin(owner) => write!(f, "owner_or_admin({owner})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NotAdmin,
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenialKind),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn admin_only(identity: &Identity) -> Decision {
    if identity.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny(DenialKind::NotAdmin)
    }
}

/// Admin short-circuits: an admin never needs to be the owner.
pub fn owner_or_admin(identity: &Identity, owner: SubjectId) -> Decision {
    if identity.is_admin() || identity.is(owner) {
        Decision::Allow
    } else {
        Decision::Deny(DenialKind::NotOwner)
    }
}

pub fn decide(identity: &Identity, policy: &Policy) -> Decision {
    match policy {
        Policy::Authenticated => Decision::Allow,
        Policy::AdminOnly => admin_only(identity),
        Policy::OwnerOrAdmin(owner) => owner_or_admin(identity, *owner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn identity(subject_id: SubjectId, role: Role) -> Identity {
        let iat = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Identity {
            subject_id,
            role,
            issued_at: iat,
            expires_at: iat + Duration::hours(1),
        }
    }

    fn subject() -> impl Strategy<Value = SubjectId> {
        any::<u128>().prop_map(|n| SubjectId::from_uuid(Uuid::from_u128(n)))
    }

    fn role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Standard), Just(Role::Admin)]
    }

    #[test]
    fn standard_user_is_denied_admin_only_with_reason() {
        let alice = identity(SubjectId::new(), Role::Standard);
        assert_eq!(admin_only(&alice), Decision::Deny(DenialKind::NotAdmin));
    }

    #[test]
    fn standard_user_is_denied_someone_elses_resource() {
        let alice = identity(SubjectId::new(), Role::Standard);
        assert_eq!(
            decide(&alice, &Policy::OwnerOrAdmin(SubjectId::new())),
            Decision::Deny(DenialKind::NotOwner)
        );
    }

    #[test]
    fn policy_display_is_stable_for_logs() {
        assert_eq!(Policy::AdminOnly.to_string(), "admin_only");
        assert_eq!(Policy::Authenticated.to_string(), "authenticated");
    }

    proptest! {
        /// Property: admin is allowed under OwnerOrAdmin for every target.
        #[test]
        fn admin_bypasses_ownership(me in subject(), owner in subject()) {
            let admin = identity(me, Role::Admin);
            prop_assert_eq!(owner_or_admin(&admin, owner), Decision::Allow);
        }

        /// Property: a standard subject is allowed exactly on what it owns.
        #[test]
        fn standard_subject_reaches_only_itself(me in subject(), other in subject()) {
            prop_assume!(me != other);
            let user = identity(me, Role::Standard);
            prop_assert_eq!(owner_or_admin(&user, me), Decision::Allow);
            prop_assert_eq!(owner_or_admin(&user, other), Decision::Deny(DenialKind::NotOwner));
        }

        /// Property: AdminOnly allows iff role = admin.
        #[test]
        fn admin_only_tracks_role(me in subject(), role in role()) {
            let who = identity(me, role);
            prop_assert_eq!(admin_only(&who).is_allowed(), role == Role::Admin);
        }

        /// Property: any verified identity passes the authenticated policy.
        #[test]
        fn authenticated_always_allows(me in subject(), role in role()) {
            prop_assert_eq!(decide(&identity(me, role), &Policy::Authenticated), Decision::Allow);
        }
    }
}
