use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
};
use tracing::{Span, warn};

use crate::application::state::AppState;
use crate::domain::ids::UserId;
use crate::domain::users::User;
use crate::infrastructure::auth::hash_token;

/// The user behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            Span::current().record("user.id", tracing::field::display(&user.user.id));
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let auth_str = auth_header.to_str().map_err(|err| {
            warn!(error = %err, "authorization header contains invalid characters");
            StatusCode::UNAUTHORIZED
        })?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token_record = state
            .token_repo
            .get_by_token_hash(&hash_token(token))
            .await
            .map_err(|err| {
                warn!(error = %err, "bearer token lookup failed");
                StatusCode::UNAUTHORIZED
            })?;

        if token_record.is_revoked() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        // Fire and forget.
        let token_repo = state.token_repo.clone();
        let token_id = token_record.id;
        tokio::spawn(async move {
            if let Err(err) = token_repo.update_last_used(token_id).await {
                warn!(error = %err, %token_id, "failed to update token last_used");
            }
        });

        let user = state
            .user_repo
            .get(token_record.user_id)
            .await
            .map_err(|err| {
                warn!(error = %err, user_id = %token_record.user_id, "user lookup failed for valid token");
                StatusCode::UNAUTHORIZED
            })?;

        Span::current().record("user.id", tracing::field::display(&user.id));
        let auth = AuthenticatedUser { user };
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}
