pub mod chunker;
pub mod documents;
pub mod domain;
pub mod error;
pub mod flashcards;
pub mod locks;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod merge;
pub mod ports;
pub mod summaries;

pub use documents::DocumentService;
pub use domain::{
    Difficulty, Document, DocumentMetadata, DocumentRef, Flashcard, FlashcardChanges,
    GeneratedFlashcard, NewFlashcard, Summary,
};
pub use error::{ServiceError, ServiceResult};
pub use flashcards::{
    DocumentFlashcards, FlashcardService, FlashcardUpdate, GenerationOutcome, PipelineConfig,
};
pub use locks::{GenerationGuard, GenerationLocks};
pub use ports::{
    DatabaseService, FlashcardGenerationService, PortError, PortResult, SummaryGenerationService,
    TextExtractionService,
};
pub use summaries::{DocumentSummary, GeneratedSummary, ParsedSummary, SummaryService};
