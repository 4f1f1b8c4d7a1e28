//! services/api/src/web/rest.rs
//!
//! Shared pieces of the REST API: the master OpenAPI definition, the response
//! envelope, the mapping from core errors to HTTP responses, and the health check.

use axum::{http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use study_buddy_core::{DocumentMetadata, DocumentRef, ServiceError};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::{documents, flashcards, summaries};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        documents::upload_document_handler,
        documents::list_documents_handler,
        documents::get_document_handler,
        documents::delete_document_handler,
        flashcards::generate_flashcards_handler,
        flashcards::list_flashcards_handler,
        flashcards::update_flashcard_handler,
        flashcards::delete_flashcard_handler,
        summaries::generate_summary_handler,
        summaries::get_summary_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            DocumentResponse,
            DocumentRefResponse,
            documents::DocumentDetailResponse,
            flashcards::GenerateFlashcardsResponse,
            flashcards::FlashcardResponse,
            flashcards::FlashcardListResponse,
            flashcards::UpdateFlashcardRequest,
            summaries::SummaryResponse,
            summaries::GenerateSummaryResponse,
            summaries::GetSummaryResponse,
        )
    ),
    tags(
        (name = "Study Buddy API", description = "Lecture PDFs, flashcards and summaries.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Response Envelope
//=========================================================================================

/// Every successful response is wrapped as `{success, message, data?}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// The body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    success: bool,
    message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ErrorResponse>;

/// Builds a successful response carrying `data`.
pub fn respond<T>(status: StatusCode, message: &str, data: T) -> ApiResult<T> {
    Ok((
        status,
        Json(Envelope {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }),
    ))
}

/// Builds a successful response with no `data` field.
pub fn respond_empty(message: &str) -> ApiResult<()> {
    Ok((
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message: message.to_string(),
            data: None,
        }),
    ))
}

pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message)))
}

/// Maps a core error to a status code and a message that is safe to show the caller.
///
/// Backend details only ever reach the log.
pub fn service_error(err: ServiceError) -> ErrorResponse {
    let (status, message) = match &err {
        ServiceError::GenerationInProgress => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::DocumentNotFound | ServiceError::FlashcardNotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        ServiceError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
        ServiceError::NoFlashcardsGenerated => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        ServiceError::ExtractionFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "Failed to extract text from the PDF".to_string(),
        ),
        ServiceError::SummaryFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "Failed to generate summary".to_string(),
        ),
        ServiceError::ChunkGenerationFailed { .. }
        | ServiceError::Persistence(_)
        | ServiceError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!(status = status.as_u16(), "Request rejected: {}", err);
    }
    (status, Json(ErrorBody::new(message)))
}

//=========================================================================================
// Shared Payload Structs
//=========================================================================================

/// Document metadata as returned to clients. Never carries the extracted text.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentMetadata> for DocumentResponse {
    fn from(meta: DocumentMetadata) -> Self {
        Self {
            id: meta.id,
            file_name: meta.file_name,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRefResponse {
    pub id: Uuid,
    pub file_name: String,
}

impl From<DocumentRef> for DocumentRefResponse {
    fn from(doc: DocumentRef) -> Self {
        Self {
            id: doc.id,
            file_name: doc.file_name,
        }
    }
}

//=========================================================================================
// Health Check
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
}

/// Liveness check. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
