use super::check_question_fields;
use super::traits::CatalogStore;
use crate::domain::{Lecture, Question, Subject};
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Tables {
    subjects: BTreeMap<i64, Subject>,
    lectures: BTreeMap<i64, Lecture>,
    questions: BTreeMap<i64, Question>,
    next_subject_id: i64,
    next_lecture_id: i64,
    next_question_id: i64,
    next_answer_id: i64,
}

impl Tables {
    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// In-memory storage implementation for development/testing.
///
/// All tables sit behind one lock so multi-row writes are all-or-nothing.
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|e| CatalogError::Database {
            message: format!("In-memory store lock poisoned: {e}"),
        })
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.tables()?.subjects.values().cloned().collect())
    }

    async fn find_subject(&self, id: i64) -> Result<Option<Subject>> {
        Ok(self.tables()?.subjects.get(&id).cloned())
    }

    async fn save_subject(&self, subject: &mut Subject) -> Result<()> {
        let mut tables = self.tables()?;
        match subject.id {
            Some(id) => {
                let existing = tables
                    .subjects
                    .get_mut(&id)
                    .ok_or_else(|| CatalogError::not_found("Subject", id))?;
                *existing = subject.clone();
                debug!("Updated subject {} with id {}", subject.name, id);
            }
            None => {
                let id = Tables::allocate(&mut tables.next_subject_id);
                subject.id = Some(id);
                tables.subjects.insert(id, subject.clone());
                debug!("Created subject {} with id {}", subject.name, id);
            }
        }
        Ok(())
    }

    async fn delete_subject(&self, id: i64) -> Result<()> {
        let mut tables = self.tables()?;
        if tables.lectures.values().any(|l| l.subject_id == Some(id)) {
            return Err(CatalogError::Conflict(format!(
                "Subject {id} still has lectures"
            )));
        }
        tables
            .subjects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CatalogError::not_found("Subject", id))
    }

    async fn exists_lecture_by_subject_id(&self, subject_id: i64) -> Result<bool> {
        Ok(self
            .tables()?
            .lectures
            .values()
            .any(|l| l.subject_id == Some(subject_id)))
    }

    async fn list_lectures(&self) -> Result<Vec<Lecture>> {
        Ok(self.tables()?.lectures.values().cloned().collect())
    }

    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>> {
        Ok(self.tables()?.lectures.get(&id).cloned())
    }

    async fn save_lecture(&self, lecture: &mut Lecture) -> Result<()> {
        let mut tables = self.tables()?;
        if let Some(subject_id) = lecture.subject_id {
            if !tables.subjects.contains_key(&subject_id) {
                return Err(CatalogError::Conflict(format!(
                    "Lecture references missing subject {subject_id}"
                )));
            }
        }
        match lecture.id {
            Some(id) => {
                let existing = tables
                    .lectures
                    .get_mut(&id)
                    .ok_or_else(|| CatalogError::not_found("Lecture", id))?;
                *existing = lecture.clone();
                debug!("Updated lecture {} with id {}", lecture.name, id);
            }
            None => {
                let id = Tables::allocate(&mut tables.next_lecture_id);
                lecture.id = Some(id);
                tables.lectures.insert(id, lecture.clone());
                debug!("Created lecture {} with id {}", lecture.name, id);
            }
        }
        Ok(())
    }

    async fn delete_lecture(&self, id: i64) -> Result<()> {
        let mut tables = self.tables()?;
        if tables.questions.values().any(|q| q.lecture_id == id) {
            return Err(CatalogError::Conflict(format!(
                "Lecture {id} still has questions"
            )));
        }
        tables
            .lectures
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CatalogError::not_found("Lecture", id))
    }

    async fn list_questions(&self) -> Result<Vec<Question>> {
        Ok(self.tables()?.questions.values().cloned().collect())
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.tables()?.questions.get(&id).cloned())
    }

    async fn find_questions_by_lecture_id(&self, lecture_id: i64) -> Result<Vec<Question>> {
        Ok(self
            .tables()?
            .questions
            .values()
            .filter(|q| q.lecture_id == lecture_id)
            .cloned()
            .collect())
    }

    async fn exists_question_by_lecture_id(&self, lecture_id: i64) -> Result<bool> {
        Ok(self
            .tables()?
            .questions
            .values()
            .any(|q| q.lecture_id == lecture_id))
    }

    async fn save_questions(&self, questions: &mut [Question]) -> Result<()> {
        let mut tables = self.tables()?;

        // Validate the whole batch before touching any table
        for question in questions.iter() {
            check_question_fields(question)?;
            if !tables.lectures.contains_key(&question.lecture_id) {
                return Err(CatalogError::Conflict(format!(
                    "Question references missing lecture {}",
                    question.lecture_id
                )));
            }
            if let Some(id) = question.id {
                if !tables.questions.contains_key(&id) {
                    return Err(CatalogError::not_found("Question", id));
                }
            }
        }

        for question in questions.iter_mut() {
            let id = match question.id {
                Some(id) => id,
                None => Tables::allocate(&mut tables.next_question_id),
            };
            question.id = Some(id);
            for answer in question.answers.iter_mut() {
                if answer.id.is_none() {
                    answer.id = Some(Tables::allocate(&mut tables.next_answer_id));
                }
                answer.question_id = Some(id);
            }
            tables.questions.insert(id, question.clone());
        }

        debug!("Saved {} questions", questions.len());
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<()> {
        let removed = self
            .tables()?
            .questions
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found("Question", id))?;
        debug!(
            "Deleted question {} with {} answers",
            id,
            removed.answers.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Answer, QuestionType};

    async fn store_with_lecture() -> (InMemoryStore, i64) {
        let store = InMemoryStore::new();
        let mut lecture = Lecture::new("1-1 Intro", None);
        store.save_lecture(&mut lecture).await.unwrap();
        (store, lecture.id.unwrap())
    }

    #[tokio::test]
    async fn test_ids_follow_insertion_order() {
        let store = InMemoryStore::new();
        let mut first = Subject::new("Algorithms");
        let mut second = Subject::new("Networks");
        store.save_subject(&mut first).await.unwrap();
        store.save_subject(&mut second).await.unwrap();

        assert!(first.id.unwrap() < second.id.unwrap());
        let names: Vec<String> = store
            .list_subjects()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Algorithms", "Networks"]);
    }

    #[tokio::test]
    async fn test_save_subject_updates_existing() {
        let store = InMemoryStore::new();
        let mut subject = Subject::new("Old");
        store.save_subject(&mut subject).await.unwrap();
        subject.name = "New".to_string();
        store.save_subject(&mut subject).await.unwrap();

        let found = store.find_subject(subject.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.name, "New");

        let mut ghost = Subject { id: Some(99), name: "Ghost".into() };
        assert!(matches!(
            store.save_subject(&mut ghost).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lecture_requires_existing_subject() {
        let store = InMemoryStore::new();
        let mut lecture = Lecture::new("1-1 Intro", Some(42));
        assert!(matches!(
            store.save_lecture(&mut lecture).await,
            Err(CatalogError::Conflict(_))
        ));
        assert!(store.list_lectures().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let (store, lecture_id) = store_with_lecture().await;
        let mut batch = vec![
            Question::new(lecture_id, "Good", QuestionType::MultipleChoice)
                .with_answers(vec![Answer::new("A", true, None)]),
            Question::new(lecture_id + 100, "Orphan", QuestionType::MultipleChoice),
        ];

        assert!(store.save_questions(&mut batch).await.is_err());
        assert!(store.list_questions().await.unwrap().is_empty());
        assert!(batch[0].id.is_none());
    }

    #[tokio::test]
    async fn test_delete_question_removes_answers() {
        let (store, lecture_id) = store_with_lecture().await;
        let mut batch = vec![Question::new(lecture_id, "Q", QuestionType::TrueFalse)
            .with_answers(vec![Answer::new("True", true, None), Answer::new("False", false, None)])];
        store.save_questions(&mut batch).await.unwrap();
        let question_id = batch[0].id.unwrap();
        assert_eq!(batch[0].answers[1].question_id, Some(question_id));

        store.delete_question(question_id).await.unwrap();
        assert!(store.find_question(question_id).await.unwrap().is_none());
        assert!(!store.exists_question_by_lecture_id(lecture_id).await.unwrap());
        assert!(matches!(
            store.delete_question(question_id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_lecture_with_questions_conflicts() {
        let (store, lecture_id) = store_with_lecture().await;
        let mut batch = vec![Question::new(lecture_id, "Q", QuestionType::ShortAnswer)];
        store.save_questions(&mut batch).await.unwrap();

        assert!(matches!(
            store.delete_lecture(lecture_id).await,
            Err(CatalogError::Conflict(_))
        ));
        assert!(store.find_lecture(lecture_id).await.unwrap().is_some());
    }
}
