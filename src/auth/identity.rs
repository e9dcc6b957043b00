use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

/// Turns a bearer token into the persisted [`User`] it names.
///
/// A bad token, a token without subject and a subject with no account all produce
/// the same `Unauthorized` error; the distinction only shows up in debug logs.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn Store>) -> Self {
        Self { tokens, store }
    }

    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let email = self.tokens.verify(token).map_err(|e| {
            log::debug!("Rejected bearer token: {}", e);
            AppError::from(e)
        })?;

        match self.store.find_user_by_email(&email).await? {
            Some(user) => Ok(user),
            None => {
                log::debug!("Bearer token subject has no account");
                Err(AppError::unauthenticated())
            }
        }
    }
}
