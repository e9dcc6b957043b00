pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use validator::Validate;

use crate::error::AppError;
use crate::models::Credentials;
use crate::store::{Store, StoreError};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use identity::IdentityResolver;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use token::{Claims, InvalidReason, TokenError, TokenService};

const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered";
const BAD_CREDENTIALS_MESSAGE: &str = "Incorrect email or password";
// Hashed once per process; unknown emails are verified against it.
const UNKNOWN_ACCOUNT_PASSWORD: &str = "taskvault-unknown-account";

/// OAuth2 password-flow form (`application/x-www-form-urlencoded`).
/// `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

impl From<TokenForm> for Credentials {
    fn from(form: TokenForm) -> Self {
        Credentials {
            email: form.username,
            password: form.password,
        }
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl AuthResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Signup and login.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    password_cost: u32,
    unknown_account_hash: Arc<OnceCell<String>>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, password_cost: u32) -> Self {
        Self {
            store,
            tokens,
            password_cost,
            unknown_account_hash: Arc::new(OnceCell::new()),
        }
    }

    /// A hash at the configured cost that no account owns.
    async fn unknown_account_hash(&self) -> Result<String, AppError> {
        let cost = self.password_cost;
        let hash = self
            .unknown_account_hash
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || {
                    hash_password_with_cost(UNKNOWN_ACCOUNT_PASSWORD, cost)
                })
                .await
                .map_err(AppError::from)
                .and_then(|hashed| hashed)
            })
            .await?;
        Ok(hash.clone())
    }

    /// Registers a new account. Fails with `BadRequest` if the email is taken.
    pub async fn signup(&self, credentials: Credentials) -> Result<(), AppError> {
        credentials.validate()?;

        if self
            .store
            .find_user_by_email(&credentials.email)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL_MESSAGE.into()));
        }

        let cost = self.password_cost;
        let password = credentials.password;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
                .await??;

        // The lookup above is only a fast path; the store's unique key is authoritative.
        match self
            .store
            .insert_user(&credentials.email, &password_hash, Utc::now())
            .await
        {
            Ok(_) => {
                log::info!("Registered new account");
                Ok(())
            }
            Err(StoreError::DuplicateKey) => {
                Err(AppError::BadRequest(DUPLICATE_EMAIL_MESSAGE.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Checks the password and issues an access token.
    ///
    /// An unknown email and a wrong password produce the same error, and both pay
    /// for one bcrypt verification.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthResponse, AppError> {
        let user = self.store.find_user_by_email(&credentials.email).await?;
        let password_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.unknown_account_hash().await?,
        };

        let password = credentials.password;
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await?;

        match user {
            Some(user) if verified => {
                let token = self.tokens.access_token(&user.email)?;
                Ok(AuthResponse::bearer(token))
            }
            Some(_) => {
                log::debug!("Login rejected for an existing account");
                Err(AppError::BadRequest(BAD_CREDENTIALS_MESSAGE.into()))
            }
            None => Err(AppError::BadRequest(BAD_CREDENTIALS_MESSAGE.into())),
        }
    }
}
