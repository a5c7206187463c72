use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::note::{Note, NoteRequest, NoteResponse};
use crate::models::MessageResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/{id}", get(get_note).put(update_note).delete(delete_note))
}

/// Ids are opaque: anything that is not a UUID cannot name a note.
fn note_id(raw: &str) -> Result<Uuid> {
    raw.parse().map_err(|_| Error::NotFound)
}

fn note_body(body: std::result::Result<Json<NoteRequest>, JsonRejection>) -> Result<NoteRequest> {
    body.map(|Json(req)| req)
        .map_err(|e| Error::Validation(e.body_text()))
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Missing title or content", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Notes"
)]
pub(crate) async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    body: std::result::Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>)> {
    let req = note_body(body)?;
    let note = state
        .notes
        .create(auth.id(), &req.title, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(NoteResponse {
            message: "Note created successfully".into(),
            note,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "Caller's notes, newest first", body = Vec<Note>),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Notes"
)]
pub(crate) async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Note>>> {
    Ok(Json(state.notes.list_by_owner(auth.id()).await?))
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note UUID")),
    responses(
        (status = 200, description = "The note", body = Note),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 404, description = "Note not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Notes"
)]
pub(crate) async fn get_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Note>> {
    let note = state.notes.get_one(auth.id(), note_id(&id)?).await?;
    Ok(Json(note))
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note UUID")),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Missing title or content", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 404, description = "Note not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Notes"
)]
pub(crate) async fn update_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: std::result::Result<Json<NoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>> {
    let id = note_id(&id)?;
    let req = note_body(body)?;
    let note = state
        .notes
        .update(auth.id(), id, &req.title, &req.content)
        .await?;

    Ok(Json(NoteResponse {
        message: "Note updated successfully".into(),
        note,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note UUID")),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 404, description = "Note not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Notes"
)]
pub(crate) async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.notes.delete(auth.id(), note_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Note deleted successfully")))
}
