//! services/api/src/web/flashcards.rs
//!
//! Handlers for generating and managing the flashcards of a document.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_buddy_core::{DocumentFlashcards, Flashcard, FlashcardUpdate, GenerationOutcome};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    rest::{
        respond, respond_empty, service_error, ApiResult, DocumentRefResponse, DocumentResponse,
        Envelope, ErrorBody,
    },
    state::AppState,
};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct GenerateFlashcardsResponse {
    document: DocumentResponse,
    count: usize,
}

impl From<GenerationOutcome> for GenerateFlashcardsResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            document: outcome.document.into(),
            count: outcome.count,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardResponse {
    id: Uuid,
    document_id: Uuid,
    front: String,
    back: String,
    difficulty: String,
    created_at: DateTime<Utc>,
}

impl From<Flashcard> for FlashcardResponse {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            document_id: card.document_id,
            front: card.front,
            back: card.back,
            difficulty: card.difficulty.to_string(),
            created_at: card.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FlashcardListResponse {
    document: DocumentRefResponse,
    count: usize,
    flashcards: Vec<FlashcardResponse>,
}

impl From<DocumentFlashcards> for FlashcardListResponse {
    fn from(list: DocumentFlashcards) -> Self {
        Self {
            document: list.document.into(),
            count: list.count,
            flashcards: list.flashcards.into_iter().map(FlashcardResponse::from).collect(),
        }
    }
}

/// A partial edit. At least one field must be present.
#[derive(Deserialize, ToSchema)]
pub struct UpdateFlashcardRequest {
    front: Option<String>,
    back: Option<String>,
    /// One of `easy`, `medium`, `hard`.
    difficulty: Option<String>,
}

impl From<UpdateFlashcardRequest> for FlashcardUpdate {
    fn from(req: UpdateFlashcardRequest) -> Self {
        Self {
            front: req.front,
            back: req.back,
            difficulty: req.difficulty,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate flashcards for a document, replacing any it already has.
#[utoipa::path(
    post,
    path = "/api/pdfs/{id}/flashcards",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (
            status = 201,
            description = "Flashcards generated",
            body = Envelope<GenerateFlashcardsResponse>
        ),
        (status = 404, description = "Document not found", body = ErrorBody),
        (status = 409, description = "Generation already running", body = ErrorBody),
        (status = 500, description = "Nothing generated or not saved", body = ErrorBody)
    )
)]
pub async fn generate_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<GenerateFlashcardsResponse> {
    let outcome = state
        .flashcards
        .generate_flashcards(document_id, user_id)
        .await
        .map_err(service_error)?;
    respond(
        StatusCode::CREATED,
        "Flashcards generated successfully",
        outcome.into(),
    )
}

#[utoipa::path(
    get,
    path = "/api/pdfs/{id}/flashcards",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (
            status = 200,
            description = "Flashcards in creation order",
            body = Envelope<FlashcardListResponse>
        ),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
pub async fn list_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<FlashcardListResponse> {
    let list = state
        .flashcards
        .list_flashcards(document_id, user_id)
        .await
        .map_err(service_error)?;
    respond(StatusCode::OK, "Flashcards retrieved successfully", list.into())
}

#[utoipa::path(
    patch,
    path = "/api/flashcards/{id}",
    params(("id" = Uuid, Path, description = "Flashcard id")),
    request_body = UpdateFlashcardRequest,
    responses(
        (status = 200, description = "Flashcard updated", body = Envelope<FlashcardResponse>),
        (status = 400, description = "Empty update or unknown difficulty", body = ErrorBody),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    )
)]
pub async fn update_flashcard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(flashcard_id): Path<Uuid>,
    Json(payload): Json<UpdateFlashcardRequest>,
) -> ApiResult<FlashcardResponse> {
    let updated = state
        .flashcards
        .update_flashcard(flashcard_id, user_id, payload.into())
        .await
        .map_err(service_error)?;
    respond(StatusCode::OK, "Flashcard updated successfully", updated.into())
}

#[utoipa::path(
    delete,
    path = "/api/flashcards/{id}",
    params(("id" = Uuid, Path, description = "Flashcard id")),
    responses(
        (status = 200, description = "Flashcard deleted"),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    )
)]
pub async fn delete_flashcard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(flashcard_id): Path<Uuid>,
) -> ApiResult<()> {
    state
        .flashcards
        .delete_flashcard(flashcard_id, user_id)
        .await
        .map_err(service_error)?;
    respond_empty("Flashcard deleted successfully")
}
