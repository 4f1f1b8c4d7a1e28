//! crates/study_buddy_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Document, Flashcard, FlashcardChanges, GeneratedFlashcard, NewFlashcard, Summary,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth ---
    /// Resolves an opaque access token to the user it was issued for.
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid>;

    // --- Document Management ---
    async fn create_document(
        &self,
        user_id: Uuid,
        file_name: &str,
        extracted_text: &str,
    ) -> PortResult<Document>;

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document>;

    /// Newest first.
    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<Document>>;

    /// Removes the document together with its flashcards and summaries.
    async fn delete_document(&self, document_id: Uuid) -> PortResult<()>;

    // --- Flashcard Management ---
    /// Atomically swaps the document's flashcard set for `flashcards`.
    ///
    /// Readers observe either the previous set or the new one, never an empty
    /// intermediate state. On error nothing is applied.
    async fn replace_flashcards(
        &self,
        document_id: Uuid,
        flashcards: Vec<NewFlashcard>,
    ) -> PortResult<()>;

    /// Returns flashcards in creation order.
    async fn list_flashcards(&self, document_id: Uuid) -> PortResult<Vec<Flashcard>>;

    async fn get_flashcard_by_id(&self, flashcard_id: Uuid) -> PortResult<Flashcard>;

    async fn update_flashcard(
        &self,
        flashcard_id: Uuid,
        changes: &FlashcardChanges,
    ) -> PortResult<Flashcard>;

    async fn delete_flashcard(&self, flashcard_id: Uuid) -> PortResult<()>;

    // --- Summary Management ---
    /// Replaces any stored summary for the document with `content`.
    async fn replace_summary(&self, document_id: Uuid, content: &str) -> PortResult<Summary>;

    async fn get_latest_summary(&self, document_id: Uuid) -> PortResult<Option<Summary>>;
}

#[async_trait]
pub trait FlashcardGenerationService: Send + Sync {
    /// Generates flashcards for one chunk of a document.
    ///
    /// `total_length` is the character length of the whole normalized document,
    /// which lets the backend scale how many cards it produces per chunk.
    async fn generate_flashcards(
        &self,
        context: &str,
        total_length: usize,
    ) -> PortResult<Vec<GeneratedFlashcard>>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Extracts readable text from the bytes of a PDF file.
    async fn extract_text(&self, file_name: &str, pdf_bytes: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait SummaryGenerationService: Send + Sync {
    /// Produces a markdown study summary of the given lecture text.
    async fn generate_summary(&self, lecture_text: &str) -> PortResult<String>;
}
