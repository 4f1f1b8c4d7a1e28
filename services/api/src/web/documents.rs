//! services/api/src/web/documents.rs
//!
//! Handlers for uploading, listing, reading and deleting lecture PDFs.

use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use study_buddy_core::Document;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    rest::{
        bad_request, respond, respond_empty, service_error, ApiResult, DocumentResponse,
        Envelope, ErrorBody, ErrorResponse,
    },
    state::AppState,
};

const PDF_MIME: &str = "application/pdf";

/// A document including its extracted text.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetailResponse {
    id: Uuid,
    file_name: String,
    extracted_text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentDetailResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            file_name: doc.file_name,
            extracted_text: doc.extracted_text,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// An uploaded file pulled out of the multipart body.
struct PdfUpload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Finds the `file` part of the form and checks that it is a PDF within the size limit.
async fn read_pdf_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<PdfUpload, ErrorResponse> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        bad_request("Malformed multipart body")
    })? {
        if field.name() != Some("file") {
            continue;
        }
        if field.content_type() != Some(PDF_MIME) {
            return Err(bad_request("Only PDF files are allowed"));
        }

        let file_name = field.file_name().unwrap_or("document.pdf").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            error!("Failed to read file bytes: {}", e);
            bad_request("Failed to read the uploaded file")
        })?;
        if bytes.len() > max_bytes {
            return Err(bad_request(format!(
                "File is too large. The limit is {} bytes",
                max_bytes
            )));
        }
        return Ok(PdfUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(bad_request("No PDF file provided"))
}

/// Upload a lecture PDF and extract its text.
#[utoipa::path(
    post,
    path = "/api/pdfs",
    request_body(
        content_type = "multipart/form-data",
        description = "A `file` part holding the PDF."
    ),
    responses(
        (status = 201, description = "PDF uploaded and saved", body = Envelope<DocumentResponse>),
        (status = 400, description = "Missing, oversized or non-PDF file", body = ErrorBody),
        (status = 502, description = "Text extraction failed", body = ErrorBody)
    )
)]
pub async fn upload_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<DocumentResponse> {
    let upload = read_pdf_field(&mut multipart, state.config.max_upload_bytes).await?;
    let metadata = state
        .documents
        .upload(user_id, &upload.file_name, &upload.bytes)
        .await
        .map_err(service_error)?;
    respond(StatusCode::CREATED, "PDF uploaded and saved", metadata.into())
}

/// List the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/api/pdfs",
    responses(
        (status = 200, description = "Documents retrieved", body = Envelope<Vec<DocumentResponse>>)
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Vec<DocumentResponse>> {
    let documents = state.documents.list(user_id).await.map_err(service_error)?;
    respond(
        StatusCode::OK,
        "Documents retrieved",
        documents.into_iter().map(DocumentResponse::from).collect(),
    )
}

#[utoipa::path(
    get,
    path = "/api/pdfs/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document retrieved", body = Envelope<DocumentDetailResponse>),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<DocumentDetailResponse> {
    let document = state
        .documents
        .get(document_id, user_id)
        .await
        .map_err(service_error)?;
    respond(StatusCode::OK, "Document retrieved", document.into())
}

/// Delete a document together with its flashcards and summaries.
#[utoipa::path(
    delete,
    path = "/api/pdfs/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<()> {
    state
        .documents
        .delete(document_id, user_id)
        .await
        .map_err(service_error)?;
    respond_empty("Document deleted successfully")
}
