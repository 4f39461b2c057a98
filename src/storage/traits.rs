use crate::domain::{Lecture, Question, Subject};
use crate::error::Result;
use async_trait::async_trait;

/// Storage trait for the catalog (subjects, lectures, questions with their answers).
///
/// `find_*` methods return `Ok(None)` for unknown ids. `save_*` methods insert when
/// the record has no id (and write the assigned id back) or update when it has one.
/// Writes that would leave a child without its parent fail with a conflict.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Subject operations
    async fn list_subjects(&self) -> Result<Vec<Subject>>;
    async fn find_subject(&self, id: i64) -> Result<Option<Subject>>;
    async fn save_subject(&self, subject: &mut Subject) -> Result<()>;
    async fn delete_subject(&self, id: i64) -> Result<()>;
    async fn exists_lecture_by_subject_id(&self, subject_id: i64) -> Result<bool>;

    // Lecture operations
    async fn list_lectures(&self) -> Result<Vec<Lecture>>;
    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>>;
    async fn save_lecture(&self, lecture: &mut Lecture) -> Result<()>;
    async fn delete_lecture(&self, id: i64) -> Result<()>;

    // Question operations (answers travel with their question)
    async fn list_questions(&self) -> Result<Vec<Question>>;
    async fn find_question(&self, id: i64) -> Result<Option<Question>>;
    async fn find_questions_by_lecture_id(&self, lecture_id: i64) -> Result<Vec<Question>>;
    async fn exists_question_by_lecture_id(&self, lecture_id: i64) -> Result<bool>;

    /// Insert every question and then its answers, in order, as one transaction.
    async fn save_questions(&self, questions: &mut [Question]) -> Result<()>;

    /// Delete a question and all of its answers as one transaction.
    async fn delete_question(&self, id: i64) -> Result<()>;
}
