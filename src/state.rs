use chrono::Duration;
use std::sync::Arc;

use crate::auth::{Authenticator, IdentityResolver, TokenService};
use crate::config::Config;
use crate::store::Store;
use crate::tasks::TaskService;

/// Services shared by all workers, registered as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Authenticator,
    pub identity: IdentityResolver,
    pub tasks: TaskService,
    pub store_backend: &'static str,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, password_cost: u32) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            store_backend: store.backend(),
            accounts: Authenticator::new(store.clone(), tokens.clone(), password_cost),
            identity: IdentityResolver::new(tokens, store.clone()),
            tasks: TaskService::new(store),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            Duration::minutes(config.token_ttl_minutes),
        );
        Self::new(store, tokens, config.bcrypt_cost)
    }
}
