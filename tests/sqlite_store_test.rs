use quiz_catalog::domain::{Answer, Lecture, Question, QuestionType, Subject};
use quiz_catalog::error::CatalogError;
use quiz_catalog::storage::{CatalogStore, SqliteStore};
use tempfile::TempDir;

fn question(lecture_id: i64, content: &str, answers: &[(&str, bool)]) -> Question {
    Question::new(lecture_id, content, QuestionType::MultipleChoice).with_answers(
        answers
            .iter()
            .map(|(text, correct)| Answer::new(*text, *correct, None))
            .collect(),
    )
}

async fn seeded_lecture(store: &SqliteStore) -> i64 {
    let mut subject = Subject::new("Algorithms");
    store.save_subject(&mut subject).await.unwrap();
    let mut lecture = Lecture::new("1-1 Intro", subject.id);
    store.save_lecture(&mut lecture).await.unwrap();
    lecture.id.unwrap()
}

#[tokio::test]
async fn test_questions_round_trip_with_answers() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("catalog.db")).unwrap();
    let lecture_id = seeded_lecture(&store).await;

    let mut batch = vec![
        question(lecture_id, "Q1", &[("A", false), ("B", true)]),
        question(lecture_id, "Q2", &[]),
    ];
    batch[0].answers[1].explanation = Some("because B".into());
    store.save_questions(&mut batch).await.unwrap();

    assert!(batch.iter().all(|q| q.id.is_some()));
    assert_eq!(batch[0].answers[0].question_id, batch[0].id);

    let stored = store.find_questions_by_lecture_id(lecture_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].content, "Q1");
    assert_eq!(stored[0].answers.len(), 2);
    assert!(stored[0].answers[1].is_correct);
    assert_eq!(stored[0].answers[1].explanation.as_deref(), Some("because B"));
    assert!(stored[1].answers.is_empty());
    assert!(store.exists_question_by_lecture_id(lecture_id).await.unwrap());
}

#[tokio::test]
async fn test_batch_with_missing_lecture_inserts_nothing() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("catalog.db")).unwrap();
    let lecture_id = seeded_lecture(&store).await;

    let mut batch = vec![
        question(lecture_id, "Fine", &[("A", true)]),
        question(9999, "Orphan", &[("A", true)]),
    ];
    let err = store.save_questions(&mut batch).await.unwrap_err();
    assert!(matches!(err, CatalogError::Conflict(_)), "got {err:?}");

    assert!(batch.iter().all(|q| q.id.is_none()));
    assert!(store.list_questions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_question_removes_answers() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("catalog.db")).unwrap();
    let lecture_id = seeded_lecture(&store).await;

    let mut batch = vec![
        question(lecture_id, "Gone", &[("A", true), ("B", false)]),
        question(lecture_id, "Kept", &[("C", true)]),
    ];
    store.save_questions(&mut batch).await.unwrap();
    let gone = batch[0].id.unwrap();

    store.delete_question(gone).await.unwrap();
    assert!(store.find_question(gone).await.unwrap().is_none());
    assert!(matches!(
        store.delete_question(gone).await,
        Err(CatalogError::NotFound(_))
    ));

    let remaining = store.list_questions().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].answers.len(), 1);
    assert_eq!(remaining[0].answers[0].content, "C");
}

#[tokio::test]
async fn test_parent_delete_is_blocked_by_children() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("catalog.db")).unwrap();
    let lecture_id = seeded_lecture(&store).await;
    let subject_id = store.list_subjects().await.unwrap()[0].id.unwrap();

    assert!(store.exists_lecture_by_subject_id(subject_id).await.unwrap());
    assert!(matches!(
        store.delete_subject(subject_id).await,
        Err(CatalogError::Conflict(_))
    ));

    let mut batch = vec![question(lecture_id, "Q", &[])];
    store.save_questions(&mut batch).await.unwrap();
    assert!(matches!(
        store.delete_lecture(lecture_id).await,
        Err(CatalogError::Conflict(_))
    ));

    store.delete_question(batch[0].id.unwrap()).await.unwrap();
    store.delete_lecture(lecture_id).await.unwrap();
    store.delete_subject(subject_id).await.unwrap();
    assert!(store.list_lectures().await.unwrap().is_empty());
    assert!(store.list_subjects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("catalog.db");

    let lecture_id = {
        let store = SqliteStore::open(&path).unwrap();
        let lecture_id = seeded_lecture(&store).await;
        let mut batch = vec![question(lecture_id, "Persisted", &[("Yes", true)])];
        store.save_questions(&mut batch).await.unwrap();
        lecture_id
    };

    let reopened = SqliteStore::open(&path).unwrap();
    let lecture = reopened.find_lecture(lecture_id).await.unwrap().unwrap();
    assert_eq!(lecture.name, "1-1 Intro");
    let questions = reopened.find_questions_by_lecture_id(lecture_id).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].content, "Persisted");
    assert_eq!(questions[0].answers[0].content, "Yes");
}
