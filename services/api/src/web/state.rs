//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_buddy_core::{DatabaseService, DocumentService, FlashcardService, SummaryService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub documents: DocumentService,
    pub flashcards: FlashcardService,
    pub summaries: SummaryService,
}
