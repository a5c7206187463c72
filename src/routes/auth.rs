use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};

use crate::error::{ApiError, Error, Result};
use crate::middleware::auth::{authenticate, bearer_token, AuthUser};
use crate::models::user::{AuthResponse, LoginRequest, PublicUser, SignupRequest};
use crate::models::MessageResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

fn issue_token(state: &AppState, user: &PublicUser) -> Result<String> {
    state
        .tokens
        .issue(user.id)
        .map_err(|e| Error::Internal(format!("failed to create token: {e}")))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    ),
    tag = "Auth"
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = body.map_err(|e| Error::Validation(e.body_text()))?;

    let user = state
        .credentials
        .register(&req.name, &req.email, &req.password)
        .await?;
    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".into(),
            token,
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Malformed body", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
    ),
    tag = "Auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(req) = body.map_err(|e| Error::Validation(e.body_text()))?;

    let user = state
        .credentials
        .authenticate(&req.email, &req.password)
        .await?;
    let user = PublicUser::from(user);
    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user,
    }))
}

/// Tokens are stateless, so logging out is the client forgetting its token.
/// The call always succeeds; a valid token only makes it show up in the log.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
    ),
    tag = "Auth"
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    if let Ok(user) = authenticate(&state, bearer_token(&headers)).await {
        tracing::info!(user_id = %user.id, "user logged out");
    }
    Json(MessageResponse::new("Logged out successfully"))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub(crate) async fn me(auth: AuthUser) -> Json<PublicUser> {
    Json(auth.user)
}
