//! crates/study_buddy_core/src/memory.rs
//!
//! An in-process implementation of `DatabaseService`.
//!
//! All state sits behind one `RwLock`, so every operation (including the
//! delete-and-insert of `replace_flashcards`) is applied as a single step that
//! concurrent readers cannot observe half-done.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Document, Flashcard, FlashcardChanges, NewFlashcard, Summary};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Default)]
struct State {
    auth_sessions: HashMap<String, Uuid>,
    documents: HashMap<Uuid, Document>,
    // Kept in insertion order, which is the listing order.
    flashcards: Vec<Flashcard>,
    summaries: Vec<Summary>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `PortError::Unexpected` until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn insert_auth_session(&self, token: &str, user_id: Uuid) {
        self.state
            .write()
            .await
            .auth_sessions
            .insert(token.to_string(), user_id);
    }

    fn check_writable(&self) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("store is unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseService for InMemoryStore {
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        self.state
            .read()
            .await
            .auth_sessions
            .get(token)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn create_document(
        &self,
        user_id: Uuid,
        file_name: &str,
        extracted_text: &str,
    ) -> PortResult<Document> {
        self.check_writable()?;
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            user_id,
            file_name: file_name.to_string(),
            extracted_text: extracted_text.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .documents
            .insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document> {
        self.state
            .read()
            .await
            .documents
            .get(&document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))
    }

    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let state = self.state.read().await;
        let mut documents: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        if state.documents.remove(&document_id).is_none() {
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }
        state.flashcards.retain(|c| c.document_id != document_id);
        state.summaries.retain(|s| s.document_id != document_id);
        Ok(())
    }

    async fn replace_flashcards(
        &self,
        document_id: Uuid,
        flashcards: Vec<NewFlashcard>,
    ) -> PortResult<()> {
        self.check_writable()?;
        let now = Utc::now();
        let mut state = self.state.write().await;
        if !state.documents.contains_key(&document_id) {
            return Err(PortError::Unexpected(format!(
                "Document {} does not exist",
                document_id
            )));
        }
        state.flashcards.retain(|c| c.document_id != document_id);
        state
            .flashcards
            .extend(flashcards.into_iter().map(|card| Flashcard {
                id: Uuid::new_v4(),
                document_id,
                front: card.front,
                back: card.back,
                difficulty: card.difficulty,
                created_at: now,
            }));
        Ok(())
    }

    async fn list_flashcards(&self, document_id: Uuid) -> PortResult<Vec<Flashcard>> {
        Ok(self
            .state
            .read()
            .await
            .flashcards
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn get_flashcard_by_id(&self, flashcard_id: Uuid) -> PortResult<Flashcard> {
        self.state
            .read()
            .await
            .flashcards
            .iter()
            .find(|c| c.id == flashcard_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Flashcard {} not found", flashcard_id)))
    }

    async fn update_flashcard(
        &self,
        flashcard_id: Uuid,
        changes: &FlashcardChanges,
    ) -> PortResult<Flashcard> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let card = state
            .flashcards
            .iter_mut()
            .find(|c| c.id == flashcard_id)
            .ok_or_else(|| PortError::NotFound(format!("Flashcard {} not found", flashcard_id)))?;

        if let Some(front) = &changes.front {
            card.front = front.clone();
        }
        if let Some(back) = &changes.back {
            card.back = back.clone();
        }
        if let Some(difficulty) = changes.difficulty {
            card.difficulty = difficulty;
        }
        Ok(card.clone())
    }

    async fn delete_flashcard(&self, flashcard_id: Uuid) -> PortResult<()> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let before = state.flashcards.len();
        state.flashcards.retain(|c| c.id != flashcard_id);
        if state.flashcards.len() == before {
            return Err(PortError::NotFound(format!("Flashcard {} not found", flashcard_id)));
        }
        Ok(())
    }

    async fn replace_summary(&self, document_id: Uuid, content: &str) -> PortResult<Summary> {
        self.check_writable()?;
        let summary = Summary {
            id: Uuid::new_v4(),
            document_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.summaries.retain(|s| s.document_id != document_id);
        state.summaries.push(summary.clone());
        Ok(summary)
    }

    async fn get_latest_summary(&self, document_id: Uuid) -> PortResult<Option<Summary>> {
        Ok(self
            .state
            .read()
            .await
            .summaries
            .iter()
            .rev()
            .find(|s| s.document_id == document_id)
            .cloned())
    }
}
