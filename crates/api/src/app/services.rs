use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;

use shopgate_auth::{
    AuthError, Authenticator, Gate, PasswordHashError, PasswordHasher, SigningKey, TokenCodec,
    TokenIssueError, TokenVerifier,
};
use shopgate_infra::{OrderStore, ProductStore, UserDirectory};

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("token codec: {0}")]
    Codec(#[from] TokenIssueError),
    #[error("password hasher: {0}")]
    Hasher(#[from] PasswordHashError),
    #[error("bootstrap admin: {0}")]
    Bootstrap(#[from] AuthError),
}

/// Shared request-independent services, handed to handlers as an `Extension`.
#[derive(Debug)]
pub struct AppServices {
    pub gate: Gate,
    pub authenticator: Authenticator<Arc<UserDirectory>>,
    pub users: Arc<UserDirectory>,
    pub orders: OrderStore,
    pub products: ProductStore,
}

/// In-memory wiring: one signing key for the life of the process, stores
/// shared through `Arc`.
pub fn build_services(config: &ApiConfig) -> Result<AppServices, StartupError> {
    let key = SigningKey::new(config.jwt_secret.clone())?;
    let codec = Arc::new(TokenCodec::new(&key, config.token_ttl)?);
    let hasher = PasswordHasher::new(config.hashing_cost)?;

    let users = Arc::new(UserDirectory::new());
    let authenticator = Authenticator::new(users.clone(), hasher, codec.clone());

    if let Some(admin) = &config.bootstrap_admin {
        authenticator.seed_admin(&admin.email, admin.password.expose_secret())?;
    }

    let verifier: Arc<dyn TokenVerifier> = codec;
    Ok(AppServices {
        gate: Gate::new(verifier),
        authenticator,
        users,
        orders: OrderStore::in_memory(),
        products: ProductStore::in_memory(),
    })
}
