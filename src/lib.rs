pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notes;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{CredentialStore, PasswordHasher, TokenService};
use crate::config::AuthConfig;
use crate::db::memory::MemoryStore;
use crate::db::{NoteRepository, UserRepository};
use crate::notes::NoteStore;

/// Immutable per-process state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub notes: NoteStore,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notes: Arc<dyn NoteRepository>,
        auth: &AuthConfig,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(users, hasher),
            notes: NoteStore::new(notes),
            tokens: TokenService::new(auth),
        }
    }

    pub fn in_memory(auth: &AuthConfig, hasher: PasswordHasher) -> Self {
        let store = MemoryStore::new();
        Self::new(Arc::new(store.clone()), Arc::new(store), auth, hasher)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::signup,
        routes::auth::login,
        routes::auth::logout,
        routes::auth::me,
        routes::notes::create_note,
        routes::notes::list_notes,
        routes::notes::get_note,
        routes::notes::update_note,
        routes::notes::delete_note,
    ),
    components(schemas(
        models::user::SignupRequest,
        models::user::LoginRequest,
        models::user::AuthResponse,
        models::user::PublicUser,
        models::note::Note,
        models::note::NoteRequest,
        models::note::NoteResponse,
        models::MessageResponse,
        error::ApiError,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup, login and session tokens"),
        (name = "Notes", description = "Private notes, visible only to their owner")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                ),
            ),
        );
    }
}

/// Full HTTP application without transport-level layers (CORS, tracing).
pub fn app(state: AppState) -> Router {
    routes::api_router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
