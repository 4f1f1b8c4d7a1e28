//! services/api/src/adapters/extraction_client.rs
//!
//! Adapter for the PDF text extraction service. Implements the
//! `TextExtractionService` port by forwarding the file as multipart form data.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use study_buddy_core::ports::{PortError, PortResult, TextExtractionService};

#[derive(Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    success: bool,
    text: Option<String>,
    message: Option<String>,
}

fn parse_extraction_response(body: &str) -> PortResult<String> {
    let response: ExtractionResponse = serde_json::from_str(body)
        .map_err(|e| PortError::Unexpected(format!("Malformed extraction response: {}", e)))?;

    match response {
        ExtractionResponse {
            success: true,
            text: Some(text),
            ..
        } => Ok(text),
        ExtractionResponse { message, .. } => Err(PortError::Unexpected(
            message.unwrap_or_else(|| "AI service failed to extract text".to_string()),
        )),
    }
}

#[derive(Clone)]
pub struct HttpExtractionAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExtractionAdapter {
    pub fn new(endpoint: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl TextExtractionService for HttpExtractionAdapter {
    async fn extract_text(&self, file_name: &str, pdf_bytes: &[u8]) -> PortResult<String> {
        let part = Part::bytes(pdf_bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = Form::new().part("file", part);

        let body = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("AI service is unavailable: {}", e)))?
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The service reports failures in the body, with or without an error status.
        parse_extraction_response(&body)
    }
}
