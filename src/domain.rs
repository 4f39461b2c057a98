use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: Option<i64>,
    pub name: String,
    pub subject_id: Option<i64>,
}

/// A question together with its answer choices, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<i64>,
    pub lecture_id: i64,
    pub content: String,
    pub question_type: QuestionType,
    pub explanation: Option<String>,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Option<i64>,
    pub question_id: Option<i64>,
    pub content: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Lecture {
    pub fn new(name: impl Into<String>, subject_id: Option<i64>) -> Self {
        Self {
            id: None,
            name: name.into(),
            subject_id,
        }
    }
}

impl Answer {
    pub fn new(content: impl Into<String>, is_correct: bool, explanation: Option<String>) -> Self {
        Self {
            id: None,
            question_id: None,
            content: content.into(),
            is_correct,
            explanation,
        }
    }
}

impl Question {
    pub fn new(lecture_id: i64, content: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            id: None,
            lecture_id,
            content: content.into(),
            question_type,
            explanation: None,
            answers: Vec::new(),
        }
    }

    pub fn with_answers(mut self, answers: Vec<Answer>) -> Self {
        self.answers = answers;
        self
    }

    /// The first answer flagged correct, if any
    pub fn first_correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    ShortAnswer,
    TrueFalse,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::ShortAnswer => "SHORT_ANSWER",
            QuestionType::TrueFalse => "TRUE_FALSE",
        }
    }

    /// Parse a label, treating anything unrecognized as multiple choice
    pub fn from_label_or_default(label: Option<&str>) -> Self {
        label
            .and_then(|l| l.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MULTIPLE_CHOICE" => Ok(QuestionType::MultipleChoice),
            "SHORT_ANSWER" => Ok(QuestionType::ShortAnswer),
            "TRUE_FALSE" => Ok(QuestionType::TrueFalse),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_type_parsing() {
        assert_eq!("TRUE_FALSE".parse::<QuestionType>(), Ok(QuestionType::TrueFalse));
        assert_eq!("short_answer".parse::<QuestionType>(), Ok(QuestionType::ShortAnswer));
        assert!("ESSAY".parse::<QuestionType>().is_err());
    }

    #[test]
    fn test_unknown_question_type_falls_back() {
        assert_eq!(
            QuestionType::from_label_or_default(Some("ESSAY")),
            QuestionType::MultipleChoice
        );
        assert_eq!(QuestionType::from_label_or_default(None), QuestionType::MultipleChoice);
        assert_eq!(
            QuestionType::from_label_or_default(Some("SHORT_ANSWER")),
            QuestionType::ShortAnswer
        );
    }

    #[test]
    fn test_first_correct_answer() {
        let q = Question::new(1, "Q", QuestionType::MultipleChoice).with_answers(vec![
            Answer::new("A", false, Some("no".into())),
            Answer::new("B", true, Some("yes".into())),
            Answer::new("C", true, Some("also".into())),
        ]);
        assert_eq!(q.first_correct_answer().map(|a| a.content.as_str()), Some("B"));
    }
}
