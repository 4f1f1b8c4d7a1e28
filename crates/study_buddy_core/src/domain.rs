//! crates/study_buddy_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A lecture document uploaded by a user, with the text extracted from it.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// The public view of the document: no raw text, no owner id.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            id: self.id,
            file_name: self.file_name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn reference(&self) -> DocumentRef {
        DocumentRef {
            id: self.id,
            file_name: self.file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The minimal document identity returned alongside listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: Uuid,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Reads a difficulty label from model output, ignoring case and
    /// surrounding whitespace. User input goes through `FromStr`, which is exact.
    pub fn from_loose(raw: &str) -> Option<Difficulty> {
        raw.trim().to_ascii_lowercase().parse().ok()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("difficulty must be one of: easy, medium, hard")]
pub struct InvalidDifficulty;

impl FromStr for Difficulty {
    type Err = InvalidDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(InvalidDifficulty),
        }
    }
}

/// A question/answer pair as returned by the generation backend for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFlashcard {
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
}

/// A flashcard about to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlashcard {
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
}

impl From<GeneratedFlashcard> for NewFlashcard {
    fn from(card: GeneratedFlashcard) -> Self {
        Self {
            front: card.question,
            back: card.answer,
            difficulty: card.difficulty,
        }
    }
}

/// A persisted flashcard belonging to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub id: Uuid,
    pub document_id: Uuid,
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

/// Field-level changes applied to a stored flashcard. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardChanges {
    pub front: Option<String>,
    pub back: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// A stored lecture summary, kept as the markdown the summarizer produced.
#[derive(Debug, Clone)]
pub struct Summary {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
