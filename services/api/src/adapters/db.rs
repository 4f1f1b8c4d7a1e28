//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use study_buddy_core::domain::{
    Difficulty, Document, Flashcard, FlashcardChanges, NewFlashcard, Summary,
};
use study_buddy_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    file_name: String,
    extracted_text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            extracted_text: self.extracted_text,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct FlashcardRecord {
    id: Uuid,
    document_id: Uuid,
    front: String,
    back: String,
    difficulty: String,
    created_at: DateTime<Utc>,
}
impl FlashcardRecord {
    fn to_domain(self) -> PortResult<Flashcard> {
        let difficulty = self.difficulty.parse::<Difficulty>().map_err(|_| {
            PortError::Unexpected(format!(
                "Flashcard {} has unknown difficulty '{}'",
                self.id, self.difficulty
            ))
        })?;
        Ok(Flashcard {
            id: self.id,
            document_id: self.document_id,
            front: self.front,
            back: self.back,
            difficulty,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    document_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> Summary {
        Summary {
            id: self.id,
            document_id: self.document_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

const DOCUMENT_COLUMNS: &str = "id, user_id, file_name, extracted_text, created_at, updated_at";
const FLASHCARD_COLUMNS: &str = "id, document_id, front, back, difficulty, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn create_document(
        &self,
        user_id: Uuid,
        file_name: &str,
        extracted_text: &str,
    ) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "INSERT INTO documents (id, user_id, file_name, extracted_text) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(file_name)
        .bind(extracted_text)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Document {} not found", document_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        // Flashcards and summaries go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }
        Ok(())
    }

    async fn replace_flashcards(
        &self,
        document_id: Uuid,
        flashcards: Vec<NewFlashcard>,
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM flashcards WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        if !flashcards.is_empty() {
            let mut insert: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO flashcards (id, document_id, front, back, difficulty, position) ",
            );
            insert.push_values(flashcards.iter().enumerate(), |mut row, (position, card)| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(document_id)
                    .push_bind(&card.front)
                    .push_bind(&card.back)
                    .push_bind(card.difficulty.as_str())
                    .push_bind(position as i32);
            });
            insert
                .build()
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        }

        // Dropping `tx` without commit rolls back, so a failure above leaves the old set.
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn list_flashcards(&self, document_id: Uuid) -> PortResult<Vec<Flashcard>> {
        let records = sqlx::query_as::<_, FlashcardRecord>(&format!(
            "SELECT {} FROM flashcards WHERE document_id = $1 \
             ORDER BY created_at ASC, position ASC",
            FLASHCARD_COLUMNS
        ))
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_flashcard_by_id(&self, flashcard_id: Uuid) -> PortResult<Flashcard> {
        sqlx::query_as::<_, FlashcardRecord>(&format!(
            "SELECT {} FROM flashcards WHERE id = $1",
            FLASHCARD_COLUMNS
        ))
        .bind(flashcard_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Flashcard {} not found", flashcard_id)))?
        .to_domain()
    }

    async fn update_flashcard(
        &self,
        flashcard_id: Uuid,
        changes: &FlashcardChanges,
    ) -> PortResult<Flashcard> {
        sqlx::query_as::<_, FlashcardRecord>(&format!(
            "UPDATE flashcards SET front = COALESCE($2, front), back = COALESCE($3, back), \
             difficulty = COALESCE($4, difficulty) WHERE id = $1 RETURNING {}",
            FLASHCARD_COLUMNS
        ))
        .bind(flashcard_id)
        .bind(changes.front.as_deref())
        .bind(changes.back.as_deref())
        .bind(changes.difficulty.map(|d| d.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Flashcard {} not found", flashcard_id)))?
        .to_domain()
    }

    async fn delete_flashcard(&self, flashcard_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1")
            .bind(flashcard_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Flashcard {} not found", flashcard_id)));
        }
        Ok(())
    }

    async fn replace_summary(&self, document_id: Uuid, content: &str) -> PortResult<Summary> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM summaries WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        let record = sqlx::query_as::<_, SummaryRecord>(
            "INSERT INTO summaries (id, document_id, content) VALUES ($1, $2, $3) \
             RETURNING id, document_id, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_latest_summary(&self, document_id: Uuid) -> PortResult<Option<Summary>> {
        let record = sqlx::query_as::<_, SummaryRecord>(
            "SELECT id, document_id, content, created_at FROM summaries \
             WHERE document_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(SummaryRecord::to_domain))
    }
}
