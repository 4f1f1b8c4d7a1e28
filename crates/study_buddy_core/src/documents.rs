//! crates/study_buddy_core/src/documents.rs
//!
//! Upload, listing and removal of a user's lecture documents.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{Document, DocumentMetadata};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError, TextExtractionService};

/// Loads a document on behalf of `user_id`.
///
/// A missing document and a document owned by someone else both come back as
/// `DocumentNotFound`, so callers cannot discover other users' ids.
pub(crate) async fn find_owned_document(
    db: &dyn DatabaseService,
    document_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Document> {
    match db.get_document_by_id(document_id).await {
        Ok(document) if document.user_id == user_id => Ok(document),
        Ok(_) | Err(PortError::NotFound(_)) => Err(ServiceError::DocumentNotFound),
        Err(e) => Err(ServiceError::Store(e)),
    }
}

#[derive(Clone)]
pub struct DocumentService {
    db: Arc<dyn DatabaseService>,
    extractor: Arc<dyn TextExtractionService>,
}

impl DocumentService {
    pub fn new(db: Arc<dyn DatabaseService>, extractor: Arc<dyn TextExtractionService>) -> Self {
        Self { db, extractor }
    }

    /// Extracts the text of an uploaded PDF and stores it as a new document.
    pub async fn upload(
        &self,
        user_id: Uuid,
        file_name: &str,
        pdf_bytes: &[u8],
    ) -> ServiceResult<DocumentMetadata> {
        if pdf_bytes.is_empty() {
            return Err(ServiceError::InvalidInput("No PDF file provided".to_string()));
        }

        let extracted_text = self
            .extractor
            .extract_text(file_name, pdf_bytes)
            .await
            .map_err(ServiceError::ExtractionFailed)?;

        let document = self
            .db
            .create_document(user_id, file_name, &extracted_text)
            .await?;
        info!(
            document_id = %document.id,
            chars = extracted_text.chars().count(),
            "Stored uploaded document"
        );
        Ok(document.metadata())
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<DocumentMetadata>> {
        let documents = self.db.list_documents_for_user(user_id).await?;
        Ok(documents.iter().map(Document::metadata).collect())
    }

    pub async fn get(&self, document_id: Uuid, user_id: Uuid) -> ServiceResult<Document> {
        find_owned_document(self.db.as_ref(), document_id, user_id).await
    }

    pub async fn delete(&self, document_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        find_owned_document(self.db.as_ref(), document_id, user_id).await?;
        match self.db.delete_document(document_id).await {
            Ok(()) => {
                info!(%document_id, "Deleted document");
                Ok(())
            }
            Err(PortError::NotFound(_)) => Err(ServiceError::DocumentNotFound),
            Err(e) => Err(ServiceError::Store(e)),
        }
    }
}
