use crate::{auth::TokenForm, error::AppError, models::Credentials, state::AppState};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;

/// Register a new user
///
/// Creates an account for the given email. Responds `201` or `400` if the email
/// is already registered.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    state.accounts.signup(credentials.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "message": "User created successfully" })))
}

/// Login user
///
/// Exchanges email and password for a bearer token.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let response = state.accounts.login(credentials.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// OAuth2 password flow: same as `/login`, but form-encoded with the email in `username`.
#[post("/token")]
pub async fn token(
    state: web::Data<AppState>,
    form: web::Form<TokenForm>,
) -> Result<impl Responder, AppError> {
    let response = state.accounts.login(form.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(response))
}
