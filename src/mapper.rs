use crate::domain::{Answer, Lecture, Question, Subject};
use crate::dto::{AnswerDto, LectureDto, QuestionDto, SubjectDto};

/// Maps stored catalog records to API transfer objects.
///
/// Stored records always carry an id; `None` only exists before insertion and maps to 0.
pub struct CatalogMapper;

impl CatalogMapper {
    pub fn to_subject_dto(subject: &Subject) -> SubjectDto {
        SubjectDto {
            id: subject.id.unwrap_or_default(),
            name: subject.name.clone(),
        }
    }

    pub fn to_lecture_dto(lecture: &Lecture) -> LectureDto {
        LectureDto {
            id: lecture.id.unwrap_or_default(),
            name: lecture.name.clone(),
            subject_id: lecture.subject_id,
        }
    }

    pub fn to_answer_dto(answer: &Answer) -> AnswerDto {
        AnswerDto {
            id: answer.id.unwrap_or_default(),
            content: answer.content.clone(),
            is_correct: answer.is_correct,
            explanation: answer.explanation.clone(),
        }
    }

    /// Build a question DTO with nested lecture and answers.
    ///
    /// A stored question-level explanation wins; otherwise the explanation of the
    /// first correct answer is surfaced.
    pub fn to_question_dto(question: &Question, lecture: &Lecture) -> QuestionDto {
        let explanation = question.explanation.clone().or_else(|| {
            question
                .first_correct_answer()
                .and_then(|a| a.explanation.clone())
        });

        QuestionDto {
            id: question.id.unwrap_or_default(),
            content: question.content.clone(),
            question_type: question.question_type,
            lecture: Self::to_lecture_dto(lecture),
            answers: question.answers.iter().map(Self::to_answer_dto).collect(),
            explanation,
        }
    }
}
