//! services/api/src/web/summaries.rs

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use study_buddy_core::{DocumentSummary, GeneratedSummary, ParsedSummary};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    rest::{
        respond, service_error, ApiResult, DocumentRefResponse, DocumentResponse, Envelope,
        ErrorBody,
    },
    state::AppState,
};

/// A stored summary, split into its sections.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    id: Uuid,
    main_topic: String,
    key_concepts: Vec<String>,
    important_details: Vec<String>,
    conclusion: String,
    created_at: DateTime<Utc>,
}

impl From<ParsedSummary> for SummaryResponse {
    fn from(s: ParsedSummary) -> Self {
        Self {
            id: s.id,
            main_topic: s.main_topic,
            key_concepts: s.key_concepts,
            important_details: s.important_details,
            conclusion: s.conclusion,
            created_at: s.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GenerateSummaryResponse {
    document: DocumentResponse,
    summary: SummaryResponse,
}

impl From<GeneratedSummary> for GenerateSummaryResponse {
    fn from(g: GeneratedSummary) -> Self {
        Self {
            document: g.document.into(),
            summary: g.summary.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GetSummaryResponse {
    document: DocumentRefResponse,
    /// `null` until a summary has been generated.
    summary: Option<SummaryResponse>,
}

impl From<DocumentSummary> for GetSummaryResponse {
    fn from(d: DocumentSummary) -> Self {
        Self {
            document: d.document.into(),
            summary: d.summary.map(SummaryResponse::from),
        }
    }
}

/// Summarize a document, replacing its previous summary.
#[utoipa::path(
    post,
    path = "/api/pdfs/{id}/summary",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 201, description = "Summary generated", body = Envelope<GenerateSummaryResponse>),
        (status = 404, description = "Document not found", body = ErrorBody),
        (status = 502, description = "The summary model failed", body = ErrorBody)
    )
)]
pub async fn generate_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<GenerateSummaryResponse> {
    let generated = state
        .summaries
        .generate_summary(document_id, user_id)
        .await
        .map_err(service_error)?;
    respond(StatusCode::CREATED, "Summary generated successfully", generated.into())
}

#[utoipa::path(
    get,
    path = "/api/pdfs/{id}/summary",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Latest summary, if any", body = Envelope<GetSummaryResponse>),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
pub async fn get_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<GetSummaryResponse> {
    let summary = state
        .summaries
        .get_summary(document_id, user_id)
        .await
        .map_err(service_error)?;
    respond(StatusCode::OK, "Summary retrieved successfully", summary.into())
}
