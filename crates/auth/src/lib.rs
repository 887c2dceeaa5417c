//! `shopgate-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: stores are
//! reached through [`CredentialStore`], time is always passed in explicitly.

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authenticator::{Authenticator, Registration};
pub use authorize::{Decision, DenialKind, Policy, admin_only, decide, owner_or_admin};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use credentials::CredentialStore;
pub use error::{AuthError, LoginFailure};
pub use gate::{AccessError, Gate};
pub use password::{HashingCost, PasswordHashError, PasswordHasher};
pub use principal::Identity;
pub use roles::Role;
pub use token::{
    InvalidToken, IssuedToken, MAX_TOKEN_TTL_SECS, MIN_SIGNING_KEY_LEN, SigningKey, TokenCodec,
    TokenError, TokenIssueError, TokenVerifier, token_ttl,
};
pub use user::{CredentialRecord, NewCredential, UserProfile, normalize_email};
