//! services/api/src/adapters/flashcard_client.rs
//!
//! This module contains the adapter for the external flashcard generation service.
//! It implements the `FlashcardGenerationService` port from the `core` crate.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use study_buddy_core::domain::{Difficulty, GeneratedFlashcard};
use study_buddy_core::ports::{FlashcardGenerationService, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct GenerationRequest<'a> {
    context: &'a str,
    total_length: usize,
}

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    success: bool,
    flashcards: Option<Vec<RawFlashcard>>,
}

#[derive(Deserialize)]
struct RawFlashcard {
    question: String,
    answer: String,
    #[serde(default)]
    difficulty: Option<String>,
}

impl RawFlashcard {
    fn into_domain(self) -> GeneratedFlashcard {
        // Absent or unrecognised difficulties fall back to easy.
        let difficulty = match self.difficulty.as_deref() {
            None => Difficulty::default(),
            Some(raw) => Difficulty::from_loose(raw).unwrap_or_else(|| {
                debug!(difficulty = raw, "Unknown difficulty from generator, using easy");
                Difficulty::default()
            }),
        };
        GeneratedFlashcard {
            question: self.question,
            answer: self.answer,
            difficulty,
        }
    }
}

/// Interprets a response body from the generation service.
///
/// Anything other than `{"success": true, "flashcards": [...]}` is an error.
fn parse_generation_response(body: &str) -> PortResult<Vec<GeneratedFlashcard>> {
    let response: GenerationResponse = serde_json::from_str(body)
        .map_err(|e| PortError::Unexpected(format!("Malformed generation response: {}", e)))?;

    match (response.success, response.flashcards) {
        (true, Some(cards)) => Ok(cards.into_iter().map(RawFlashcard::into_domain).collect()),
        (true, None) => Err(PortError::Unexpected(
            "Generation response did not contain a flashcards array".to_string(),
        )),
        (false, _) => Err(PortError::Unexpected(
            "Generation service reported failure".to_string(),
        )),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Calls the flashcard service over HTTP, one POST per chunk.
#[derive(Clone)]
pub struct HttpFlashcardAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFlashcardAdapter {
    /// Creates a new `HttpFlashcardAdapter` whose requests give up after `timeout`.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

//=========================================================================================
// `FlashcardGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FlashcardGenerationService for HttpFlashcardAdapter {
    async fn generate_flashcards(
        &self,
        context: &str,
        total_length: usize,
    ) -> PortResult<Vec<GeneratedFlashcard>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerationRequest {
                context,
                total_length,
            })
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "Generation service returned {}: {}",
                status, body
            )));
        }
        parse_generation_response(&body)
    }
}
