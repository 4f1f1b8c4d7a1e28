pub mod documents;
pub mod flashcards;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod summaries;

pub use middleware::require_auth;
pub use rest::ApiDoc;
