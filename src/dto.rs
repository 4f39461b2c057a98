use crate::domain::QuestionType;
use serde::{Deserialize, Serialize};

// Response shapes

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureDto {
    pub id: i64,
    pub name: String,
    pub subject_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDto {
    pub id: i64,
    pub content: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: i64,
    pub content: String,
    pub question_type: QuestionType,
    pub lecture: LectureDto,
    pub answers: Vec<AnswerDto>,
    pub explanation: Option<String>,
}

// Request shapes

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureRequest {
    pub name: String,
    #[serde(default)]
    pub subject_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminAuthRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /api/questions/upload`
///
/// ```json
/// {
///   "lectureId": 1,
///   "questions": [
///     {
///       "content": "Which one?",
///       "choices": [
///         { "content": "A", "isCorrect": false },
///         { "content": "B", "isCorrect": true, "explanation": "because B" }
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuestionsRequest {
    pub lecture_id: i64,
    pub questions: Vec<UploadQuestionItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuestionItem {
    pub content: String,
    /// Free-form label; unknown values fall back to multiple choice
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub choices: Vec<UploadChoiceItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChoiceItem {
    pub content: String,
    #[serde(alias = "correct")]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}
