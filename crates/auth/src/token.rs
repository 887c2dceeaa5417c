//! Token Codec: issues and verifies signed, time-bounded identity assertions.
//!
//! Tokens are HS256 JWTs over [`TokenClaims`]. The signing key is supplied by
//! configuration at startup and held immutably inside the codec.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use shopgate_core::SubjectId;

use crate::{Identity, Role, TokenClaims, TokenValidationError, validate_claims};

/// Minimum accepted signing secret length, in bytes.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Longest accepted token lifetime, in seconds (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Process-wide HMAC signing secret.
#[derive(Debug)]
pub struct SigningKey(SecretString);

impl SigningKey {
    pub fn new(secret: SecretString) -> Result<Self, TokenIssueError> {
        if secret.expose_secret().len() < MIN_SIGNING_KEY_LEN {
            return Err(TokenIssueError::WeakKey);
        }
        Ok(Self(secret))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("signing key must be at least {MIN_SIGNING_KEY_LEN} bytes")]
    WeakKey,

    #[error("token ttl must be between 1 and {MAX_TOKEN_TTL_SECS} seconds")]
    TtlOutOfRange,

    #[error("token expiry is not representable")]
    ExpiryOverflow,

    #[error("token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Why a presented token was refused. Never shown to the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error(transparent)]
    Window(#[from] TokenValidationError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// No token was presented: the caller should authenticate.
    #[error("access token not supplied")]
    Missing,

    /// A token was presented but refused: the caller should re-authenticate.
    #[error("access token rejected: {0}")]
    Invalid(#[from] InvalidToken),
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Verification side of the codec, as seen by the gate.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError>;

    /// Verify an optionally-presented token. Absent and blank are both `Missing`.
    fn verify_presented(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, TokenError> {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => self.verify(token, now),
            None => Err(TokenError::Missing),
        }
    }
}

/// Token lifetime from a number of seconds, within `1..=MAX_TOKEN_TTL_SECS`.
pub fn token_ttl(secs: i64) -> Result<Duration, TokenIssueError> {
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        return Err(TokenIssueError::TtlOutOfRange);
    }
    Duration::try_seconds(secs).ok_or(TokenIssueError::TtlOutOfRange)
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(key: &SigningKey, ttl: Duration) -> Result<Self, TokenIssueError> {
        if ttl <= Duration::zero() || ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(TokenIssueError::TtlOutOfRange);
        }

        // Expiry is checked by `validate_claims` against an explicit `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["exp", "sub"].iter().map(|c| c.to_string()).collect();

        Ok(Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Sign a token for `subject_id` valid from `now` (truncated to whole
    /// seconds) until `now + ttl`.
    pub fn issue(
        &self,
        subject_id: SubjectId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenIssueError> {
        let iat = now.trunc_subsecs(0);
        let exp = iat
            .checked_add_signed(self.ttl)
            .ok_or(TokenIssueError::ExpiryOverflow)?;
        let claims = TokenClaims {
            sub: subject_id,
            role,
            iat,
            exp,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, claims })
    }
}

impl TokenVerifier for TokenCodec {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => InvalidToken::BadSignature,
                _ => InvalidToken::Malformed,
            })?;

        validate_claims(&data.claims, now).map_err(InvalidToken::from)?;
        Ok(Identity::from(data.claims))
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    const SECRET: &str = "unit-test-signing-secret-0123456789abcdef";

    fn codec(ttl_secs: i64) -> TokenCodec {
        let key = SigningKey::new(SecretString::from(SECRET.to_string())).unwrap();
        TokenCodec::new(&key, Duration::seconds(ttl_secs)).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn issued_token_decodes_to_the_same_identity() {
        let codec = codec(3600);
        let alice = SubjectId::new();

        let issued = codec.issue(alice, Role::Standard, t0()).unwrap();
        let identity = codec.verify(&issued.token, t0()).unwrap();

        assert_eq!(identity.subject_id, alice);
        assert_eq!(identity.role, Role::Standard);
        assert_eq!(identity.issued_at, t0());
        assert_eq!(identity.expires_at, t0() + Duration::seconds(3600));
    }

    #[test]
    fn short_secrets_are_refused() {
        let err = SigningKey::new(SecretString::from("too-short".to_string())).unwrap_err();
        assert!(matches!(err, TokenIssueError::WeakKey));
    }

    #[test]
    fn ttl_outside_range_is_refused() {
        let key = SigningKey::new(SecretString::from(SECRET.to_string())).unwrap();
        let err = TokenCodec::new(&key, Duration::zero()).unwrap_err();
        assert!(matches!(err, TokenIssueError::TtlOutOfRange));
        let err = TokenCodec::new(&key, Duration::seconds(MAX_TOKEN_TTL_SECS + 1)).unwrap_err();
        assert!(matches!(err, TokenIssueError::TtlOutOfRange));
    }

    #[test]
    fn ttl_from_seconds_is_bounded() {
        assert_eq!(token_ttl(60).unwrap(), Duration::seconds(60));
        assert_eq!(
            token_ttl(MAX_TOKEN_TTL_SECS).unwrap(),
            Duration::seconds(MAX_TOKEN_TTL_SECS)
        );
        assert!(matches!(token_ttl(0), Err(TokenIssueError::TtlOutOfRange)));
        assert!(matches!(
            token_ttl(10_000_000_000_000),
            Err(TokenIssueError::TtlOutOfRange)
        ));
        assert!(matches!(token_ttl(i64::MAX), Err(TokenIssueError::TtlOutOfRange)));
    }

    #[test]
    fn expiry_past_the_calendar_end_is_an_error() {
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::seconds(10);
        let err = codec(3600)
            .issue(SubjectId::new(), Role::Standard, near_end)
            .unwrap_err();
        assert!(matches!(err, TokenIssueError::ExpiryOverflow));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other_key =
            SigningKey::new(SecretString::from("another-signing-secret-abcdefghijklmnop".to_string())).unwrap();
        let other = TokenCodec::new(&other_key, Duration::seconds(60)).unwrap();
        let issued = other.issue(SubjectId::new(), Role::Admin, t0()).unwrap();

        assert_eq!(
            codec(60).verify(&issued.token, t0()),
            Err(TokenError::Invalid(InvalidToken::BadSignature))
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec(60);
        let alice = SubjectId::new();
        let genuine = codec.issue(alice, Role::Standard, t0()).unwrap().token;

        // Same subject escalated to admin, signed with a guessed key, then the
        // genuine signature spliced back on.
        let forged_key =
            SigningKey::new(SecretString::from("attacker-guessed-secret-0000000000000".to_string())).unwrap();
        let forged = TokenCodec::new(&forged_key, Duration::seconds(60))
            .unwrap()
            .issue(alice, Role::Admin, t0())
            .unwrap()
            .token;

        let signature = genuine.rsplit('.').next().unwrap();
        let body = forged.rsplit_once('.').unwrap().0;
        let spliced = format!("{body}.{signature}");

        assert_eq!(
            codec.verify(&spliced, t0()),
            Err(TokenError::Invalid(InvalidToken::BadSignature))
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            codec(60).verify("definitely.not.a-jwt", t0()),
            Err(TokenError::Invalid(InvalidToken::Malformed))
        );
    }

    #[test]
    fn absent_or_blank_token_is_missing() {
        let codec = codec(60);
        assert_eq!(codec.verify_presented(None, t0()), Err(TokenError::Missing));
        assert_eq!(codec.verify_presented(Some("   "), t0()), Err(TokenError::Missing));
        assert!(matches!(
            codec.verify_presented(Some("junk"), t0()),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn subsecond_issue_time_is_truncated() {
        let codec = codec(60);
        let now = t0() + Duration::milliseconds(750);
        let issued = codec.issue(SubjectId::new(), Role::Standard, now).unwrap();
        assert_eq!(issued.claims.iat, t0());
        assert_eq!(issued.claims.exp, t0() + Duration::seconds(60));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: a token with ttl t verifies at every whole second in
        /// [iat, iat + t) and is rejected as expired from iat + t onwards.
        #[test]
        fn token_lives_exactly_ttl_seconds(
            ttl in 1i64..10_000_000,
            within in 0.0f64..1.0,
            beyond in 0i64..100_000,
        ) {
            let codec = codec(ttl);
            let issued = codec.issue(SubjectId::new(), Role::Standard, t0()).unwrap();

            let alive_at = t0() + Duration::seconds((within * ttl as f64) as i64);
            prop_assert!(codec.verify(&issued.token, alive_at).is_ok());

            let dead_at = t0() + Duration::seconds(ttl + beyond);
            prop_assert_eq!(
                codec.verify(&issued.token, dead_at),
                Err(TokenError::Invalid(InvalidToken::Window(TokenValidationError::Expired)))
            );
        }
    }
}
