//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the Summary-Generating LLM.
//! It implements the `SummaryGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_buddy_core::ports::{PortError, PortResult, SummaryGenerationService};

const SYSTEM_PROMPT: &str = "You are an academic assistant helping students with lecture material.

Summarize the lecture content you are given using exactly this markdown structure:

## Main Topic
One or two sentences naming the core subject of the lecture.

## Key Concepts
- **Concept Name**: What it is, how it works and why it matters.

## Important Details
- A specific, exam-relevant detail, with numbers, comparisons or formulas where relevant.
- Give between 5 and 10 details.

## Conclusion
Two or three paragraphs connecting the key ideas and explaining their broader significance.

Rules:
- Be precise. The summary is used for exam revision.
- Do not add sections or text outside this structure.
- Do not use JSON or code blocks.";

/// An adapter that implements `SummaryGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl SummaryGenerationService for OpenAiSummaryAdapter {
    async fn generate_summary(&self, lecture_text: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Lecture content:\n{}", lecture_text))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(2048u32)
            .temperature(0.3)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                PortError::Unexpected("Summary LLM response contained no text content.".to_string())
            })
    }
}
