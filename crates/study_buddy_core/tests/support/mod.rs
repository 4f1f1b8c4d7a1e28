//! Fakes shared by the core integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use study_buddy_core::memory::InMemoryStore;
use study_buddy_core::{
    DatabaseService, Difficulty, Document, FlashcardGenerationService, FlashcardService,
    GeneratedFlashcard, GenerationLocks, NewFlashcard, PipelineConfig, PortError, PortResult,
    SummaryGenerationService, TextExtractionService,
};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

pub fn card(question: &str) -> GeneratedFlashcard {
    GeneratedFlashcard {
        question: question.to_string(),
        answer: format!("Answer to {question}"),
        difficulty: Difficulty::Easy,
    }
}

pub fn new_card(front: &str) -> NewFlashcard {
    card(front).into()
}

/// A document of `sentences` sentences, each 99 characters long.
pub fn lecture_text(sentences: usize) -> String {
    (0..sentences)
        .map(|i| {
            let mut s = format!("Sentence {i:03} ");
            while s.len() < 98 {
                s.push('x');
            }
            s.push('.');
            s
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn seed_document(store: &InMemoryStore, owner: Uuid, text: &str) -> Document {
    store
        .create_document(owner, "lecture-01.pdf", text)
        .await
        .expect("seed document")
}

pub fn pipeline(
    store: Arc<InMemoryStore>,
    generator: Arc<dyn FlashcardGenerationService>,
    config: PipelineConfig,
) -> (FlashcardService, Arc<GenerationLocks>) {
    let locks = Arc::new(GenerationLocks::new());
    let service = FlashcardService::new(store, generator, Arc::clone(&locks), config);
    (service, locks)
}

/// Replies with pre-scripted outcomes in call order and records every context it saw.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<PortResult<Vec<GeneratedFlashcard>>>>,
    pub contexts: Mutex<Vec<(String, usize)>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<PortResult<Vec<GeneratedFlashcard>>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }
}

#[async_trait]
impl FlashcardGenerationService for ScriptedGenerator {
    async fn generate_flashcards(
        &self,
        context: &str,
        total_length: usize,
    ) -> PortResult<Vec<GeneratedFlashcard>> {
        self.contexts
            .lock()
            .unwrap()
            .push((context.to_string(), total_length));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unexpected("no scripted reply".to_string())))
    }
}

/// Answers each chunk after a delay that shrinks with the chunk's position, so
/// later chunks finish first when dispatched concurrently.
pub struct ReverseLatencyGenerator {
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ReverseLatencyGenerator {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FlashcardGenerationService for ReverseLatencyGenerator {
    async fn generate_flashcards(
        &self,
        context: &str,
        _total_length: usize,
    ) -> PortResult<Vec<GeneratedFlashcard>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Contexts start with "Sentence NNN"; chunk order follows NNN.
        let position: u64 = context[9..12].parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(200u64.saturating_sub(position * 2))).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![card(&context[..12]), card("Shared question")])
    }
}

/// Blocks the first call until the test opens the gate; later calls answer at once.
pub struct GatedGenerator {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub entered: Notify,
}

impl GatedGenerator {
    pub fn new() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let generator = Self {
            gate: Mutex::new(Some(rx)),
            entered: Notify::new(),
        };
        (generator, tx)
    }
}

#[async_trait]
impl FlashcardGenerationService for GatedGenerator {
    async fn generate_flashcards(
        &self,
        _context: &str,
        _total_length: usize,
    ) -> PortResult<Vec<GeneratedFlashcard>> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.entered.notify_one();
            let _ = gate.await;
        }
        Ok(vec![card("Gated question")])
    }
}

/// Never answers within any reasonable timeout.
pub struct StalledGenerator;

#[async_trait]
impl FlashcardGenerationService for StalledGenerator {
    async fn generate_flashcards(
        &self,
        _context: &str,
        _total_length: usize,
    ) -> PortResult<Vec<GeneratedFlashcard>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![card("Too late")])
    }
}

pub struct FixedExtractor(pub PortResult<String>);

#[async_trait]
impl TextExtractionService for FixedExtractor {
    async fn extract_text(&self, _file_name: &str, _pdf_bytes: &[u8]) -> PortResult<String> {
        match &self.0 {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

pub struct FixedSummarizer(pub PortResult<String>);

#[async_trait]
impl SummaryGenerationService for FixedSummarizer {
    async fn generate_summary(&self, _lecture_text: &str) -> PortResult<String> {
        match &self.0 {
            Ok(markdown) => Ok(markdown.clone()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}
