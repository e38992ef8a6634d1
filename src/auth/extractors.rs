use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::{jwt::JwtKeys, repo::User},
    error::ApiError,
    state::AppState,
};

/// Resolves the bearer token to an active user row. Handlers that require
/// authentication take this as an argument; everything that can go wrong
/// (missing header, bad scheme, invalid or expired token, unknown subject,
/// deactivated account) rejects with the same 401 so clients cannot probe
/// which accounts exist.
#[derive(Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(not_authenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(not_authenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            not_authenticated()
        })?;

        let user = User::find_by_email(&state.db, &claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "token subject not found");
                not_authenticated()
            })?;

        if !user.is_active {
            warn!(user_id = user.id, "inactive user");
            return Err(not_authenticated());
        }

        Ok(CurrentUser(user))
    }
}

fn not_authenticated() -> ApiError {
    ApiError::Unauthorized("Not authenticated".to_string())
}
