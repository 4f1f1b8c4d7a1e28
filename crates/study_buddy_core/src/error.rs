//! crates/study_buddy_core/src/error.rs
//!
//! The error type returned by the core services to their callers.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Another generation run currently holds the lock for this document.
    #[error("Flashcard generation is already in progress for this document. Please wait.")]
    GenerationInProgress,

    /// The document does not exist or belongs to someone else.
    #[error("Document not found")]
    DocumentNotFound,

    #[error("Flashcard not found")]
    FlashcardNotFound,

    #[error("{0}")]
    InvalidInput(String),

    /// One chunk could not be turned into flashcards. Absorbed by the pipeline,
    /// never returned as the outcome of a run.
    #[error("Generation failed for chunk {index}: {source}")]
    ChunkGenerationFailed { index: usize, source: PortError },

    #[error("AI service returned no flashcards")]
    NoFlashcardsGenerated,

    #[error("Failed to persist flashcards: {0}")]
    Persistence(PortError),

    #[error("Text extraction failed: {0}")]
    ExtractionFailed(PortError),

    #[error("Summary generation failed: {0}")]
    SummaryFailed(PortError),

    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
