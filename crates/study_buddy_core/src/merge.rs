//! crates/study_buddy_core/src/merge.rs
//!
//! Combines the flashcards produced for each chunk of a document into one set.

use std::collections::HashSet;

use crate::domain::GeneratedFlashcard;
use crate::error::{ServiceError, ServiceResult};

/// Flattens per-chunk results in chunk order and drops repeated questions.
///
/// Questions are compared by exact string equality and the earliest occurrence
/// wins. An empty result is an error: a run that produced nothing must not
/// wipe the document's existing flashcards.
pub fn merge_flashcards<I>(per_chunk: I) -> ServiceResult<Vec<GeneratedFlashcard>>
where
    I: IntoIterator<Item = Vec<GeneratedFlashcard>>,
{
    let mut seen = HashSet::new();
    let merged: Vec<GeneratedFlashcard> = per_chunk
        .into_iter()
        .flatten()
        .filter(|card| seen.insert(card.question.clone()))
        .collect();

    if merged.is_empty() {
        return Err(ServiceError::NoFlashcardsGenerated);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;

    fn card(question: &str, answer: &str) -> GeneratedFlashcard {
        GeneratedFlashcard {
            question: question.to_string(),
            answer: answer.to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn keeps_first_occurrence_across_chunks() {
        let merged = merge_flashcards(vec![
            vec![card("Q1", "first"), card("Q2", "a")],
            vec![card("Q3", "b"), card("Q1", "second")],
        ])
        .unwrap();

        let questions: Vec<_> = merged.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(merged[0].answer, "first");
    }

    #[test]
    fn duplicates_within_a_chunk_are_removed() {
        let merged = merge_flashcards(vec![vec![card("Q", "1"), card("Q", "2")]]).unwrap();
        assert_eq!(merged, vec![card("Q", "1")]);
    }

    #[test]
    fn near_duplicates_are_distinct() {
        let merged =
            merge_flashcards(vec![vec![card("What is Rust?", "a"), card("what is Rust?", "b")]])
                .unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = merge_flashcards(vec![Vec::new(), Vec::new()]);
        assert!(matches!(result, Err(ServiceError::NoFlashcardsGenerated)));

        let result = merge_flashcards(Vec::<Vec<GeneratedFlashcard>>::new());
        assert!(matches!(result, Err(ServiceError::NoFlashcardsGenerated)));
    }
}
