//! crates/study_buddy_core/src/flashcards.rs
//!
//! The flashcard generation pipeline and the per-card management operations.
//!
//! A generation run locks the document, checks ownership, chunks the normalized
//! text, asks the generation backend for cards chunk by chunk, merges the
//! results and atomically swaps them in for the document's previous set.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chunker::{chunk_text, normalize_text, DEFAULT_CHUNK_SIZE};
use crate::documents::find_owned_document;
use crate::domain::{
    Difficulty, DocumentMetadata, DocumentRef, Flashcard, FlashcardChanges, GeneratedFlashcard,
    NewFlashcard,
};
use crate::error::{ServiceError, ServiceResult};
use crate::locks::GenerationLocks;
use crate::merge::merge_flashcards;
use crate::ports::{DatabaseService, FlashcardGenerationService, PortError};

/// Default bound on a single call to the generation backend.
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(120);

/// Tunables for a generation run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound, in characters, for one chunk.
    pub chunk_size: usize,
    /// Each backend call is abandoned after this long and counted as failed.
    pub chunk_timeout: Duration,
    /// How many chunks may be in flight at once. Results are merged in chunk
    /// order regardless.
    pub max_concurrent_chunks: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            max_concurrent_chunks: 1,
        }
    }
}

/// The result of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub document: DocumentMetadata,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct DocumentFlashcards {
    pub document: DocumentRef,
    pub count: usize,
    pub flashcards: Vec<Flashcard>,
}

/// A partial edit requested by a user. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct FlashcardUpdate {
    pub front: Option<String>,
    pub back: Option<String>,
    pub difficulty: Option<String>,
}

impl FlashcardUpdate {
    fn into_changes(self) -> ServiceResult<FlashcardChanges> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let front = non_empty(self.front);
        let back = non_empty(self.back);
        let difficulty = non_empty(self.difficulty);

        if front.is_none() && back.is_none() && difficulty.is_none() {
            return Err(ServiceError::InvalidInput(
                "At least one field must be provided: front, back, or difficulty".to_string(),
            ));
        }

        let difficulty = difficulty
            .map(|d| d.parse::<Difficulty>())
            .transpose()
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

        Ok(FlashcardChanges {
            front,
            back,
            difficulty,
        })
    }
}

#[derive(Clone)]
pub struct FlashcardService {
    db: Arc<dyn DatabaseService>,
    generator: Arc<dyn FlashcardGenerationService>,
    locks: Arc<GenerationLocks>,
    config: PipelineConfig,
}

impl FlashcardService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        generator: Arc<dyn FlashcardGenerationService>,
        locks: Arc<GenerationLocks>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            db,
            generator,
            locks,
            config,
        }
    }

    /// Regenerates the flashcard set of a document owned by `user_id`.
    ///
    /// Fails fast with `GenerationInProgress` if a run for the same document is
    /// already in flight. Chunks whose generation fails are logged and skipped;
    /// the run only fails if no chunk produced any card.
    pub async fn generate_flashcards(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<GenerationOutcome> {
        let _guard = self.locks.acquire(document_id).ok_or_else(|| {
            warn!(%document_id, "Flashcard generation already in progress");
            ServiceError::GenerationInProgress
        })?;

        let document = find_owned_document(self.db.as_ref(), document_id, user_id).await?;

        let text = normalize_text(&document.extracted_text);
        let total_length = text.chars().count();
        let chunks = chunk_text(&text, self.config.chunk_size);
        info!(
            %document_id,
            chunks = chunks.len(),
            total_length,
            "Starting flashcard generation"
        );

        let per_chunk = self.generate_all_chunks(chunks, total_length).await;
        let generated: usize = per_chunk.iter().map(Vec::len).sum();

        let merged = merge_flashcards(per_chunk).map_err(|e| {
            warn!(%document_id, "No chunk produced any flashcards");
            e
        })?;
        info!(%document_id, total = generated, unique = merged.len(), "Merged flashcards");

        let new_cards: Vec<NewFlashcard> = merged.into_iter().map(NewFlashcard::from).collect();
        let count = new_cards.len();
        self.db
            .replace_flashcards(document_id, new_cards)
            .await
            .map_err(ServiceError::Persistence)?;

        Ok(GenerationOutcome {
            document: document.metadata(),
            count,
        })
    }

    /// Runs every chunk through the backend and returns the cards per chunk,
    /// in chunk order. A failed chunk contributes an empty list.
    async fn generate_all_chunks(
        &self,
        chunks: Vec<String>,
        total_length: usize,
    ) -> Vec<Vec<GeneratedFlashcard>> {
        let chunk_count = chunks.len();
        let timeout = self.config.chunk_timeout;

        stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let generator = Arc::clone(&self.generator);
                async move {
                    debug!(
                        chunk = index + 1,
                        of = chunk_count,
                        chars = chunk.chars().count(),
                        "Generating chunk"
                    );
                    match generate_chunk(generator, index, chunk, total_length, timeout).await {
                        Ok(cards) => {
                            info!(
                                chunk = index + 1,
                                of = chunk_count,
                                cards = cards.len(),
                                "Chunk generated"
                            );
                            cards
                        }
                        Err(e) => {
                            warn!(
                                chunk = index + 1,
                                of = chunk_count,
                                error = %e,
                                "Chunk generation failed"
                            );
                            Vec::new()
                        }
                    }
                }
            })
            .buffered(self.config.max_concurrent_chunks.max(1))
            .collect()
            .await
    }

    pub async fn list_flashcards(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<DocumentFlashcards> {
        let document = find_owned_document(self.db.as_ref(), document_id, user_id).await?;
        let flashcards = self.db.list_flashcards(document_id).await?;

        Ok(DocumentFlashcards {
            document: document.reference(),
            count: flashcards.len(),
            flashcards,
        })
    }

    pub async fn update_flashcard(
        &self,
        flashcard_id: Uuid,
        user_id: Uuid,
        update: FlashcardUpdate,
    ) -> ServiceResult<Flashcard> {
        let changes = update.into_changes()?;
        self.assert_flashcard_ownership(flashcard_id, user_id).await?;

        match self.db.update_flashcard(flashcard_id, &changes).await {
            Ok(card) => Ok(card),
            Err(PortError::NotFound(_)) => Err(ServiceError::FlashcardNotFound),
            Err(e) => Err(ServiceError::Store(e)),
        }
    }

    pub async fn delete_flashcard(&self, flashcard_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.assert_flashcard_ownership(flashcard_id, user_id).await?;

        match self.db.delete_flashcard(flashcard_id).await {
            Ok(()) => Ok(()),
            Err(PortError::NotFound(_)) => Err(ServiceError::FlashcardNotFound),
            Err(e) => Err(ServiceError::Store(e)),
        }
    }

    async fn assert_flashcard_ownership(
        &self,
        flashcard_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Flashcard> {
        let card = match self.db.get_flashcard_by_id(flashcard_id).await {
            Ok(card) => card,
            Err(PortError::NotFound(_)) => return Err(ServiceError::FlashcardNotFound),
            Err(e) => return Err(ServiceError::Store(e)),
        };

        match find_owned_document(self.db.as_ref(), card.document_id, user_id).await {
            Ok(_) => Ok(card),
            Err(ServiceError::DocumentNotFound) => Err(ServiceError::FlashcardNotFound),
            Err(e) => Err(e),
        }
    }
}

async fn generate_chunk(
    generator: Arc<dyn FlashcardGenerationService>,
    index: usize,
    chunk: String,
    total_length: usize,
    timeout: Duration,
) -> ServiceResult<Vec<GeneratedFlashcard>> {
    match tokio::time::timeout(timeout, generator.generate_flashcards(&chunk, total_length)).await
    {
        Ok(Ok(cards)) => Ok(cards),
        Ok(Err(source)) => Err(ServiceError::ChunkGenerationFailed { index, source }),
        Err(_) => Err(ServiceError::ChunkGenerationFailed {
            index,
            source: PortError::Unexpected(format!("timed out after {}s", timeout.as_secs_f64())),
        }),
    }
}
