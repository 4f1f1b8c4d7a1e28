//! Flashcard management, document and summary services against the in-memory store.

mod support;

use std::sync::Arc;

use study_buddy_core::memory::InMemoryStore;
use study_buddy_core::{
    DatabaseService, Difficulty, DocumentService, FlashcardUpdate, PipelineConfig, PortError,
    ServiceError, SummaryService,
};
use support::*;
use uuid::Uuid;

const SUMMARY_MARKDOWN: &str = concat!(
    "## Main Topic\nVirtual memory.\n\n",
    "## Key Concepts\n- **Paging**: fixed-size pages.\n\n",
    "## Important Details\n- TLB misses are costly.\n- Page size is often 4 KiB.\n\n",
    "## Conclusion\nVirtual memory isolates processes.",
);

async fn seeded_cards(store: &Arc<InMemoryStore>, owner: Uuid) -> (Uuid, Vec<Uuid>) {
    let document = seed_document(store, owner, "Lecture.").await;
    store
        .replace_flashcards(document.id, vec![new_card("Q1"), new_card("Q2")])
        .await
        .unwrap();
    let ids = store
        .list_flashcards(document.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    (document.id, ids)
}

#[tokio::test]
async fn listing_returns_cards_in_creation_order() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let (document_id, _) = seeded_cards(&store, owner).await;
    let (service, _) = pipeline(
        store,
        Arc::new(ScriptedGenerator::default()),
        PipelineConfig::default(),
    );

    let listing = service.list_flashcards(document_id, owner).await.unwrap();

    assert_eq!(listing.document.id, document_id);
    assert_eq!(listing.document.file_name, "lecture-01.pdf");
    assert_eq!(listing.count, 2);
    assert_eq!(listing.flashcards[0].front, "Q1");
    assert_eq!(listing.flashcards[1].front, "Q2");
}

#[tokio::test]
async fn listing_someone_elses_document_is_not_found() {
    let store = Arc::new(InMemoryStore::new());
    let (document_id, _) = seeded_cards(&store, Uuid::new_v4()).await;
    let (service, _) = pipeline(
        store,
        Arc::new(ScriptedGenerator::default()),
        PipelineConfig::default(),
    );

    let err = service.list_flashcards(document_id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::DocumentNotFound));
}

#[tokio::test]
async fn owner_can_update_individual_fields() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let (_, ids) = seeded_cards(&store, owner).await;
    let (service, _) = pipeline(
        store,
        Arc::new(ScriptedGenerator::default()),
        PipelineConfig::default(),
    );

    let updated = service
        .update_flashcard(
            ids[0],
            owner,
            FlashcardUpdate {
                back: Some("A better answer".to_string()),
                difficulty: Some("medium".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.front, "Q1");
    assert_eq!(updated.back, "A better answer");
    assert_eq!(updated.difficulty, Difficulty::Medium);
}

#[tokio::test]
async fn invalid_updates_are_rejected_before_touching_the_store() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let (service, _) = pipeline(
        store,
        Arc::new(ScriptedGenerator::default()),
        PipelineConfig::default(),
    );

    // The id does not even exist: validation runs first.
    let err = service
        .update_flashcard(Uuid::new_v4(), owner, FlashcardUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn strangers_cannot_edit_or_delete_cards() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let (document_id, ids) = seeded_cards(&store, owner).await;
    let (service, _) = pipeline(
        store.clone(),
        Arc::new(ScriptedGenerator::default()),
        PipelineConfig::default(),
    );

    let update = FlashcardUpdate {
        front: Some("Hijacked".to_string()),
        ..Default::default()
    };
    let err = service.update_flashcard(ids[0], stranger, update).await.unwrap_err();
    assert!(matches!(err, ServiceError::FlashcardNotFound));

    let err = service.delete_flashcard(ids[0], stranger).await.unwrap_err();
    assert!(matches!(err, ServiceError::FlashcardNotFound));

    assert_eq!(store.list_flashcards(document_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn owner_can_delete_a_card() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let (document_id, ids) = seeded_cards(&store, owner).await;
    let (service, _) = pipeline(
        store.clone(),
        Arc::new(ScriptedGenerator::default()),
        PipelineConfig::default(),
    );

    service.delete_flashcard(ids[0], owner).await.unwrap();

    let remaining = store.list_flashcards(document_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].front, "Q2");

    let err = service.delete_flashcard(ids[0], owner).await.unwrap_err();
    assert!(matches!(err, ServiceError::FlashcardNotFound));
}

#[tokio::test]
async fn upload_stores_extracted_text_and_returns_metadata() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let documents = DocumentService::new(
        store.clone(),
        Arc::new(FixedExtractor(Ok("Extracted lecture text.".to_string()))),
    );

    let metadata = documents.upload(owner, "os-week3.pdf", b"%PDF-1.7").await.unwrap();

    assert_eq!(metadata.file_name, "os-week3.pdf");
    let stored = documents.get(metadata.id, owner).await.unwrap();
    assert_eq!(stored.extracted_text, "Extracted lecture text.");
    assert_eq!(documents.list(owner).await.unwrap(), vec![metadata]);
    assert!(documents.list(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_fails_when_extraction_fails() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let documents = DocumentService::new(
        store.clone(),
        Arc::new(FixedExtractor(Err(PortError::Unexpected("service down".to_string())))),
    );

    let err = documents.upload(owner, "a.pdf", b"%PDF").await.unwrap_err();
    assert!(matches!(err, ServiceError::ExtractionFailed(_)));

    let err = documents.upload(owner, "a.pdf", b"").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(documents.list(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_document_removes_its_cards_and_is_owner_only() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let (document_id, ids) = seeded_cards(&store, owner).await;
    let documents =
        DocumentService::new(store.clone(), Arc::new(FixedExtractor(Ok(String::new()))));

    let err = documents.delete(document_id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::DocumentNotFound));

    documents.delete(document_id, owner).await.unwrap();
    assert!(matches!(
        store.get_flashcard_by_id(ids[0]).await,
        Err(PortError::NotFound(_))
    ));
    let err = documents.get(document_id, owner).await.unwrap_err();
    assert!(matches!(err, ServiceError::DocumentNotFound));
}

#[tokio::test]
async fn summary_is_generated_stored_and_parsed() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let document = seed_document(&store, owner, "Paging lecture.").await;
    let summaries = SummaryService::new(
        store.clone(),
        Arc::new(FixedSummarizer(Ok(SUMMARY_MARKDOWN.to_string()))),
    );

    let empty = summaries.get_summary(document.id, owner).await.unwrap();
    assert!(empty.summary.is_none());

    let generated = summaries.generate_summary(document.id, owner).await.unwrap();
    assert_eq!(generated.document.id, document.id);
    assert_eq!(generated.summary.main_topic, "Virtual memory.");
    assert_eq!(generated.summary.key_concepts, vec!["**Paging**: fixed-size pages."]);
    assert_eq!(generated.summary.important_details.len(), 2);

    let again = summaries.generate_summary(document.id, owner).await.unwrap();
    let fetched = summaries.get_summary(document.id, owner).await.unwrap();
    assert_eq!(fetched.summary.map(|s| s.id), Some(again.summary.id));
}

#[tokio::test]
async fn summary_failures_and_foreign_documents() {
    let store = Arc::new(InMemoryStore::new());
    let owner = Uuid::new_v4();
    let document = seed_document(&store, owner, "Lecture.").await;
    let summaries = SummaryService::new(
        store.clone(),
        Arc::new(FixedSummarizer(Err(PortError::Unexpected("rate limited".to_string())))),
    );

    let err = summaries.generate_summary(document.id, owner).await.unwrap_err();
    assert!(matches!(err, ServiceError::SummaryFailed(_)));

    let err = summaries.get_summary(document.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::DocumentNotFound));
}

#[tokio::test]
async fn auth_sessions_resolve_to_their_user() {
    let store = InMemoryStore::new();
    let user = Uuid::new_v4();
    store.insert_auth_session("token-abc", user).await;

    assert_eq!(store.validate_auth_session("token-abc").await.unwrap(), user);
    assert!(matches!(
        store.validate_auth_session("forged").await,
        Err(PortError::Unauthorized)
    ));
}
