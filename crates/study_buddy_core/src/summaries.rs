//! crates/study_buddy_core/src/summaries.rs
//!
//! Generation and retrieval of lecture summaries.
//!
//! Summaries are stored as the markdown returned by the summarizer and parsed
//! into sections when read back.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{error, info};
use uuid::Uuid;

use crate::documents::find_owned_document;
use crate::domain::{DocumentMetadata, DocumentRef, Summary};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, SummaryGenerationService};

/// A stored summary split into its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSummary {
    pub id: Uuid,
    pub main_topic: String,
    pub key_concepts: Vec<String>,
    pub important_details: Vec<String>,
    pub conclusion: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GeneratedSummary {
    pub document: DocumentMetadata,
    pub summary: ParsedSummary,
}

#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub document: DocumentRef,
    pub summary: Option<ParsedSummary>,
}

fn section_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"(?m)^##[ \t]+(.+?)[ \t]*$").expect("valid section pattern"))
}

fn bullet_prefix() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    BULLET.get_or_init(|| Regex::new(r"^[-*]\s+").expect("valid bullet pattern"))
}

/// Splits summary markdown into `## Heading` sections, keyed by heading.
fn sections(markdown: &str) -> HashMap<String, String> {
    let headers: Vec<_> = section_header().captures_iter(markdown).collect();
    let mut out = HashMap::new();

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(markdown.len(), |m| m.start());
        let body = markdown[whole.end()..body_end].trim();
        out.entry(title.as_str().to_string())
            .or_insert_with(|| body.to_string());
    }
    out
}

fn to_list(section: &str) -> Vec<String> {
    section
        .lines()
        .map(|line| bullet_prefix().replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn to_paragraph(section: &str) -> String {
    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a stored summary. Missing sections come back empty.
pub fn parse_summary(summary: &Summary) -> ParsedSummary {
    let sections = sections(&summary.content);
    let get = |name: &str| sections.get(name).map(String::as_str).unwrap_or("");

    ParsedSummary {
        id: summary.id,
        main_topic: to_paragraph(get("Main Topic")),
        key_concepts: to_list(get("Key Concepts")),
        important_details: to_list(get("Important Details")),
        conclusion: to_paragraph(get("Conclusion")),
        created_at: summary.created_at,
    }
}

#[derive(Clone)]
pub struct SummaryService {
    db: Arc<dyn DatabaseService>,
    summarizer: Arc<dyn SummaryGenerationService>,
}

impl SummaryService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        summarizer: Arc<dyn SummaryGenerationService>,
    ) -> Self {
        Self { db, summarizer }
    }

    /// Summarizes the document and replaces any summary stored for it.
    pub async fn generate_summary(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<GeneratedSummary> {
        let document = find_owned_document(self.db.as_ref(), document_id, user_id).await?;

        let markdown = self
            .summarizer
            .generate_summary(&document.extracted_text)
            .await
            .map_err(|e| {
                error!(%document_id, error = %e, "Summary generation failed");
                ServiceError::SummaryFailed(e)
            })?;

        let stored = self.db.replace_summary(document_id, markdown.trim()).await?;
        info!(%document_id, summary_id = %stored.id, "Stored new summary");

        Ok(GeneratedSummary {
            document: document.metadata(),
            summary: parse_summary(&stored),
        })
    }

    pub async fn get_summary(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<DocumentSummary> {
        let document = find_owned_document(self.db.as_ref(), document_id, user_id).await?;
        let summary = self.db.get_latest_summary(document_id).await?;

        Ok(DocumentSummary {
            document: document.reference(),
            summary: summary.as_ref().map(parse_summary),
        })
    }
}
