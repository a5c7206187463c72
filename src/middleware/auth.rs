use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::PublicUser;
use crate::AppState;

/// Extractor for authenticated requests. Resolves the bearer token to a
/// live user before the handler body runs; any failure rejects the request
/// with `Unauthenticated`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: PublicUser,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = std::result::Result<Self, Self::Rejection>> + Send {
        let state = state.clone();
        let token = bearer_token(&parts.headers).map(|s| s.to_string());

        async move {
            let user = authenticate(&state, token.as_deref()).await?;
            Ok(AuthUser { user })
        }
    }
}

/// `Authorization: Bearer <token>`, scheme matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Token → user id → live user. Every failure collapses to `Unauthenticated`.
pub async fn authenticate(state: &AppState, token: Option<&str>) -> Result<PublicUser> {
    let token = token.ok_or_else(|| {
        tracing::debug!("no bearer token provided");
        Error::Unauthenticated
    })?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, "rejected token");
        Error::Unauthenticated
    })?;

    let user = state.credentials.find_by_id(user_id).await?.ok_or_else(|| {
        tracing::warn!(user_id = %user_id, "token subject no longer exists");
        Error::Unauthenticated
    })?;

    Ok(PublicUser::from(user))
}
