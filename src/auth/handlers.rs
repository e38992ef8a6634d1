use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Form, Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{PublicUser, RegisterRequest, TokenForm, TokenResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/token", post(login))
        .route("/users/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Looks up the user and checks the password. Unknown email and wrong
/// password are indistinguishable to the caller.
async fn authenticate_user(
    db: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let Some(user) = User::find_by_email(db, email).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.hashed_password)? {
        return Ok(None);
    }
    Ok(Some(user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if !is_valid_email(&payload.email) {
        warn!("invalid email");
        return Err(ApiError::BadRequest("Invalid email".to_string()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &payload.name, &hash)
        .await
        .map_err(|e| {
            // A concurrent registration can slip past the pre-check; the
            // unique constraint reports it the same way.
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already registered".to_string())
            } else {
                ApiError::from(e)
            }
        })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(user) = authenticate_user(&state.db, &form.username, &form.password).await? else {
        warn!(username = %form.username, "login failed");
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    };

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user.email)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("dev@novartis.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
