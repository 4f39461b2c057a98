pub mod in_memory;
pub mod sqlite;
pub mod traits;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::CatalogStore;

use crate::domain::{Answer, Question};
use crate::error::{CatalogError, Result};

/// Checks shared by both backends before a question row is written
pub(crate) fn check_question_fields(question: &Question) -> Result<()> {
    if question.content.trim().is_empty() {
        return Err(CatalogError::Validation(
            "question content is required".to_string(),
        ));
    }
    question.answers.iter().try_for_each(check_answer_fields)
}

fn check_answer_fields(answer: &Answer) -> Result<()> {
    if answer.content.trim().is_empty() {
        return Err(CatalogError::Validation(
            "answer content is required".to_string(),
        ));
    }
    Ok(())
}
