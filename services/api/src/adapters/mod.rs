pub mod db;
pub mod extraction_client;
pub mod flashcard_client;
pub mod summary_llm;

pub use db::DbAdapter;
pub use extraction_client::HttpExtractionAdapter;
pub use flashcard_client::HttpFlashcardAdapter;
pub use summary_llm::OpenAiSummaryAdapter;
