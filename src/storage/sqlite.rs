use super::check_question_fields;
use super::traits::CatalogStore;
use crate::domain::{Answer, Lecture, Question, QuestionType, Subject};
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA_SQL: &str = include_str!("../../migrations/001_create_catalog_tables.sql");

const QUESTION_COLUMNS: &str = "id, lecture_id, content, question_type, explanation";

/// SQLite-backed catalog storage. One connection, serialized behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and bootstrap the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        // journal_mode reports the resulting mode as a row
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        debug!("SQLite journal mode: {}", mode);
        info!("Opened catalog database at {}", path.display());
        Self::bootstrap(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| CatalogError::Database {
            message: format!("SQLite connection lock poisoned: {e}"),
        })
    }
}

fn row_to_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: Some(row.get(0)?),
        name: row.get(1)?,
    })
}

fn row_to_lecture(row: &Row<'_>) -> rusqlite::Result<Lecture> {
    Ok(Lecture {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        subject_id: row.get(2)?,
    })
}

fn row_to_question(row: &Row<'_>) -> rusqlite::Result<Question> {
    let question_type: Option<String> = row.get(3)?;
    Ok(Question {
        id: Some(row.get(0)?),
        lecture_id: row.get(1)?,
        content: row.get(2)?,
        question_type: QuestionType::from_label_or_default(question_type.as_deref()),
        explanation: row.get(4)?,
        answers: Vec::new(),
    })
}

fn row_to_answer(row: &Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: Some(row.get(0)?),
        question_id: Some(row.get(1)?),
        content: row.get(2)?,
        is_correct: row.get(3)?,
        explanation: row.get(4)?,
    })
}

fn attach_answers(conn: &Connection, questions: &mut [Question]) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT id, question_id, content, is_correct, explanation
         FROM answers WHERE question_id = ?1 ORDER BY id",
    )?;
    for question in questions.iter_mut() {
        if let Some(id) = question.id {
            question.answers = stmt
                .query_map(params![id], row_to_answer)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }
    }
    Ok(())
}

fn query_questions<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(sql)?;
    let mut questions = stmt
        .query_map(params, row_to_question)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_answers(conn, &mut questions)?;
    Ok(questions)
}

fn exists(conn: &Connection, sql: &str, id: i64) -> Result<bool> {
    let found: Option<i64> = conn.query_row(sql, params![id], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM subjects ORDER BY id")?;
        let subjects = stmt
            .query_map([], row_to_subject)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(subjects)
    }

    async fn find_subject(&self, id: i64) -> Result<Option<Subject>> {
        let conn = self.conn()?;
        let subject = conn
            .query_row(
                "SELECT id, name FROM subjects WHERE id = ?1",
                params![id],
                row_to_subject,
            )
            .optional()?;
        Ok(subject)
    }

    async fn save_subject(&self, subject: &mut Subject) -> Result<()> {
        let conn = self.conn()?;
        match subject.id {
            Some(id) => {
                let updated = conn.execute(
                    "UPDATE subjects SET name = ?1 WHERE id = ?2",
                    params![subject.name, id],
                )?;
                if updated == 0 {
                    return Err(CatalogError::not_found("Subject", id));
                }
            }
            None => {
                conn.execute("INSERT INTO subjects (name) VALUES (?1)", params![subject.name])?;
                subject.id = Some(conn.last_insert_rowid());
            }
        }
        debug!("Saved subject {} with id {:?}", subject.name, subject.id);
        Ok(())
    }

    async fn delete_subject(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        if exists(&conn, "SELECT 1 FROM lectures WHERE subject_id = ?1 LIMIT 1", id)? {
            return Err(CatalogError::Conflict(format!(
                "Subject {id} still has lectures"
            )));
        }
        let deleted = conn.execute("DELETE FROM subjects WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CatalogError::not_found("Subject", id));
        }
        Ok(())
    }

    async fn exists_lecture_by_subject_id(&self, subject_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        exists(
            &conn,
            "SELECT 1 FROM lectures WHERE subject_id = ?1 LIMIT 1",
            subject_id,
        )
    }

    async fn list_lectures(&self) -> Result<Vec<Lecture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, subject_id FROM lectures ORDER BY id")?;
        let lectures = stmt
            .query_map([], row_to_lecture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lectures)
    }

    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>> {
        let conn = self.conn()?;
        let lecture = conn
            .query_row(
                "SELECT id, name, subject_id FROM lectures WHERE id = ?1",
                params![id],
                row_to_lecture,
            )
            .optional()?;
        Ok(lecture)
    }

    async fn save_lecture(&self, lecture: &mut Lecture) -> Result<()> {
        let conn = self.conn()?;
        match lecture.id {
            Some(id) => {
                let updated = conn.execute(
                    "UPDATE lectures SET name = ?1, subject_id = ?2 WHERE id = ?3",
                    params![lecture.name, lecture.subject_id, id],
                )?;
                if updated == 0 {
                    return Err(CatalogError::not_found("Lecture", id));
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO lectures (name, subject_id) VALUES (?1, ?2)",
                    params![lecture.name, lecture.subject_id],
                )?;
                lecture.id = Some(conn.last_insert_rowid());
            }
        }
        debug!("Saved lecture {} with id {:?}", lecture.name, lecture.id);
        Ok(())
    }

    async fn delete_lecture(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        if exists(&conn, "SELECT 1 FROM questions WHERE lecture_id = ?1 LIMIT 1", id)? {
            return Err(CatalogError::Conflict(format!(
                "Lecture {id} still has questions"
            )));
        }
        let deleted = conn.execute("DELETE FROM lectures WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CatalogError::not_found("Lecture", id));
        }
        Ok(())
    }

    async fn list_questions(&self) -> Result<Vec<Question>> {
        let conn = self.conn()?;
        query_questions(
            &conn,
            &format!("SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id"),
            params![],
        )
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        let conn = self.conn()?;
        let mut questions = query_questions(
            &conn,
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
            params![id],
        )?;
        Ok(questions.pop())
    }

    async fn find_questions_by_lecture_id(&self, lecture_id: i64) -> Result<Vec<Question>> {
        let conn = self.conn()?;
        query_questions(
            &conn,
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE lecture_id = ?1 ORDER BY id"),
            params![lecture_id],
        )
    }

    async fn exists_question_by_lecture_id(&self, lecture_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        exists(
            &conn,
            "SELECT 1 FROM questions WHERE lecture_id = ?1 LIMIT 1",
            lecture_id,
        )
    }

    async fn save_questions(&self, questions: &mut [Question]) -> Result<()> {
        for question in questions.iter() {
            check_question_fields(question)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut assigned: Vec<(i64, Vec<i64>)> = Vec::with_capacity(questions.len());

        for question in questions.iter() {
            let question_id = match question.id {
                Some(id) => {
                    let updated = tx.execute(
                        "UPDATE questions SET content = ?1, question_type = ?2, explanation = ?3, lecture_id = ?4
                         WHERE id = ?5",
                        params![
                            question.content,
                            question.question_type.as_str(),
                            question.explanation,
                            question.lecture_id,
                            id
                        ],
                    )?;
                    if updated == 0 {
                        return Err(CatalogError::not_found("Question", id));
                    }
                    tx.execute("DELETE FROM answers WHERE question_id = ?1", params![id])?;
                    id
                }
                None => {
                    tx.execute(
                        "INSERT INTO questions (content, question_type, explanation, lecture_id)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![
                            question.content,
                            question.question_type.as_str(),
                            question.explanation,
                            question.lecture_id
                        ],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            let mut answer_ids = Vec::with_capacity(question.answers.len());
            for answer in &question.answers {
                // A NULL id lets SQLite assign the next rowid
                tx.execute(
                    "INSERT INTO answers (id, content, is_correct, explanation, question_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        answer.id,
                        answer.content,
                        answer.is_correct,
                        answer.explanation,
                        question_id
                    ],
                )?;
                answer_ids.push(tx.last_insert_rowid());
            }
            assigned.push((question_id, answer_ids));
        }

        tx.commit()?;

        // Ids are only written back once the batch is durable
        for (question, (question_id, answer_ids)) in questions.iter_mut().zip(assigned) {
            question.id = Some(question_id);
            for (answer, answer_id) in question.answers.iter_mut().zip(answer_ids) {
                answer.id = Some(answer_id);
                answer.question_id = Some(question_id);
            }
        }
        debug!("Saved {} questions", questions.len());
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let answers = tx.execute("DELETE FROM answers WHERE question_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CatalogError::not_found("Question", id));
        }
        tx.commit()?;
        debug!("Deleted question {} with {} answers", id, answers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_bootstrap_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.conn().unwrap();
            conn.execute_batch(SCHEMA_SQL).unwrap();
        }
        assert!(store.list_subjects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut lecture = Lecture::new("1-1 Intro", Some(7));
        let err = store.save_lecture(&mut lecture).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)), "got {err:?}");
        assert!(lecture.id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_stored_type_reads_as_multiple_choice() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut lecture = Lecture::new("1-1 Intro", None);
        store.save_lecture(&mut lecture).await.unwrap();
        {
            let conn = store.conn().unwrap();
            conn.execute(
                "INSERT INTO questions (content, question_type, lecture_id) VALUES ('Q', 'ESSAY', ?1)",
                params![lecture.id],
            )
            .unwrap();
        }
        let questions = store.list_questions().await.unwrap();
        assert_eq!(questions[0].question_type, QuestionType::MultipleChoice);
    }
}
