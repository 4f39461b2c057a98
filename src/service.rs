use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::constants::MAX_NAME_LEN;
use crate::domain::{Answer, Lecture, Question, QuestionType, Subject};
use crate::dto::{
    CreateLectureRequest, CreateSubjectRequest, LectureDto, QuestionDto, SubjectDto,
    UploadQuestionItem, UploadQuestionsRequest,
};
use crate::error::{CatalogError, Result};
use crate::mapper::CatalogMapper;
use crate::metrics::{self, CatalogMetrics};
use crate::ordering::sort_lectures;
use crate::storage::CatalogStore;

/// Catalog operations: validate, read or write the store, map to DTOs.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_subjects(&self) -> Result<Vec<SubjectDto>> {
        let subjects = self.store.list_subjects().await?;
        Ok(subjects.iter().map(CatalogMapper::to_subject_dto).collect())
    }

    /// All lectures, ordered by their `chapter-section` name prefix
    pub async fn list_lectures(&self) -> Result<Vec<LectureDto>> {
        let mut lectures = self.store.list_lectures().await?;
        sort_lectures(&mut lectures);
        Ok(lectures.iter().map(CatalogMapper::to_lecture_dto).collect())
    }

    pub async fn list_questions_by_lecture(&self, lecture_id: i64) -> Result<Vec<QuestionDto>> {
        let lecture = self.require_lecture(lecture_id).await?;
        let questions = self.store.find_questions_by_lecture_id(lecture_id).await?;
        debug!("Lecture {} has {} questions", lecture_id, questions.len());
        Ok(questions
            .iter()
            .map(|q| CatalogMapper::to_question_dto(q, &lecture))
            .collect())
    }

    /// Every question with its answers, for moderation
    pub async fn list_all_questions(&self) -> Result<Vec<QuestionDto>> {
        let lectures: HashMap<i64, Lecture> = self
            .store
            .list_lectures()
            .await?
            .into_iter()
            .filter_map(|l| l.id.map(|id| (id, l)))
            .collect();

        self.store
            .list_questions()
            .await?
            .iter()
            .map(|q| {
                let lecture = lectures.get(&q.lecture_id).ok_or_else(|| CatalogError::Database {
                    message: format!(
                        "Question {:?} references missing lecture {}",
                        q.id, q.lecture_id
                    ),
                })?;
                Ok(CatalogMapper::to_question_dto(q, lecture))
            })
            .collect()
    }

    /// Insert every uploaded question and its choices, or none of them.
    /// Returns the number of questions inserted.
    pub async fn upload_questions(&self, request: UploadQuestionsRequest) -> Result<usize> {
        let result = self.store_upload(request).await;
        match &result {
            Ok(inserted) => CatalogMetrics::record_upload(*inserted),
            Err(_) => CatalogMetrics::record_upload_rejected(),
        }
        result
    }

    async fn store_upload(&self, request: UploadQuestionsRequest) -> Result<usize> {
        let lecture_id = request.lecture_id;
        // An unknown lecture is a bad upload body, not a missing resource
        if self.store.find_lecture(lecture_id).await?.is_none() {
            return Err(CatalogError::Validation(format!(
                "Lecture {lecture_id} not found"
            )));
        }

        let mut questions = request
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, item)| build_question(lecture_id, index, item))
            .collect::<Result<Vec<_>>>()?;

        if !questions.is_empty() {
            self.store.save_questions(&mut questions).await?;
        }
        info!(
            "Uploaded {} questions to lecture {}",
            questions.len(),
            lecture_id
        );
        Ok(questions.len())
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<()> {
        if self.store.find_question(question_id).await?.is_none() {
            return Err(CatalogError::not_found("Question", question_id));
        }
        self.store.delete_question(question_id).await?;
        CatalogMetrics::record_deleted(metrics::QUESTION);
        info!("Deleted question {}", question_id);
        Ok(())
    }

    pub async fn create_lecture(&self, request: CreateLectureRequest) -> Result<LectureDto> {
        let name = validate_name("lecture", &request.name)?;
        if let Some(subject_id) = request.subject_id {
            if self.store.find_subject(subject_id).await?.is_none() {
                return Err(CatalogError::not_found("Subject", subject_id));
            }
        }

        let mut lecture = Lecture::new(name, request.subject_id);
        self.store.save_lecture(&mut lecture).await?;
        CatalogMetrics::record_created(metrics::LECTURE);
        info!("Created lecture {:?} ({})", lecture.id, lecture.name);
        Ok(CatalogMapper::to_lecture_dto(&lecture))
    }

    pub async fn delete_lecture(&self, lecture_id: i64) -> Result<()> {
        self.require_lecture(lecture_id).await?;
        if self.store.exists_question_by_lecture_id(lecture_id).await? {
            return Err(CatalogError::Conflict(format!(
                "Lecture {lecture_id} still has questions and cannot be deleted"
            )));
        }
        self.store.delete_lecture(lecture_id).await?;
        CatalogMetrics::record_deleted(metrics::LECTURE);
        info!("Deleted lecture {}", lecture_id);
        Ok(())
    }

    pub async fn create_subject(&self, request: CreateSubjectRequest) -> Result<SubjectDto> {
        let name = validate_name("subject", &request.name)?;
        let mut subject = Subject::new(name);
        self.store.save_subject(&mut subject).await?;
        CatalogMetrics::record_created(metrics::SUBJECT);
        info!("Created subject {:?} ({})", subject.id, subject.name);
        Ok(CatalogMapper::to_subject_dto(&subject))
    }

    pub async fn delete_subject(&self, subject_id: i64) -> Result<()> {
        if self.store.find_subject(subject_id).await?.is_none() {
            return Err(CatalogError::not_found("Subject", subject_id));
        }
        if self.store.exists_lecture_by_subject_id(subject_id).await? {
            return Err(CatalogError::Conflict(format!(
                "Subject {subject_id} still has lectures and cannot be deleted"
            )));
        }
        self.store.delete_subject(subject_id).await?;
        CatalogMetrics::record_deleted(metrics::SUBJECT);
        info!("Deleted subject {}", subject_id);
        Ok(())
    }

    async fn require_lecture(&self, lecture_id: i64) -> Result<Lecture> {
        self.store
            .find_lecture(lecture_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Lecture", lecture_id))
    }
}

fn validate_name(kind: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation(format!("{kind} name is required")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CatalogError::Validation(format!(
            "{kind} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn build_question(lecture_id: i64, index: usize, item: UploadQuestionItem) -> Result<Question> {
    if item.content.trim().is_empty() {
        return Err(CatalogError::Validation(format!(
            "question #{} has no content",
            index + 1
        )));
    }
    if let Some(pos) = item.choices.iter().position(|c| c.content.trim().is_empty()) {
        return Err(CatalogError::Validation(format!(
            "question #{} choice #{} has no content",
            index + 1,
            pos + 1
        )));
    }

    let question_type = QuestionType::from_label_or_default(item.question_type.as_deref());
    let answers = item
        .choices
        .into_iter()
        .map(|c| Answer::new(c.content, c.is_correct, non_blank(c.explanation)))
        .collect();

    let mut question = Question::new(lecture_id, item.content, question_type).with_answers(answers);
    question.explanation = non_blank(item.explanation);
    Ok(question)
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
