// src/models/question.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Minimum length of the question text after trimming.
pub const MIN_QUESTION_LEN: usize = 5;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub lesson_id: i64,
    pub course_id: i64,

    /// The text content of the question.
    pub question: String,

    /// The four answer options, stored as a JSON array.
    pub options: Json<Vec<String>>,

    /// Must be one of `options`, compared verbatim.
    pub correct_answer: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    pub fn content(&self) -> QuestionContent {
        QuestionContent {
            question: self.question.clone(),
            options: self.options.0.clone(),
            correct_answer: self.correct_answer.clone(),
        }
    }

    /// Exact string equality, no trimming or case folding.
    pub fn is_correct_answer(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// The mutable part of a question. Create and update both funnel through
/// [`QuestionContent::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContent {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionContent {
    pub fn validate(&self) -> AppResult<()> {
        if self.question.trim().chars().count() < MIN_QUESTION_LEN {
            return Err(AppError::InvalidInput(format!(
                "Question must be at least {} characters long",
                MIN_QUESTION_LEN
            )));
        }

        if self.options.len() != OPTION_COUNT {
            return Err(AppError::InvalidInput(format!(
                "Options must be an array of exactly {} strings, received {}",
                OPTION_COUNT,
                self.options.len()
            )));
        }

        if self.options.iter().any(|opt| opt.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "All options must be non-empty strings".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(OPTION_COUNT);
        for opt in &self.options {
            if !seen.insert(opt.trim().to_lowercase()) {
                return Err(AppError::InvalidInput(format!(
                    "All options must be unique (duplicate: '{}')",
                    opt
                )));
            }
        }

        if !self.options.contains(&self.correct_answer) {
            return Err(AppError::InvalidInput(
                "Correct answer must be one of the provided options".to_string(),
            ));
        }

        Ok(())
    }

    /// Applies the fields present in `patch` and returns the merged content.
    pub fn merge(&self, patch: &UpdateQuestionRequest) -> Self {
        Self {
            question: patch.question.clone().unwrap_or_else(|| self.question.clone()),
            options: patch.options.clone().unwrap_or_else(|| self.options.clone()),
            correct_answer: patch
                .correct_answer
                .clone()
                .unwrap_or_else(|| self.correct_answer.clone()),
        }
    }
}

/// A validated question ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub lesson_id: i64,
    pub course_id: i64,
    pub content: QuestionContent,
}

/// DTO for sending a question to a learner (excludes the correct answer).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: i64,
    pub lesson_id: i64,
    pub course_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            lesson_id: q.lesson_id,
            course_id: q.course_id,
            question: q.question,
            options: q.options.0,
            created_at: q.created_at,
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_option_lengths))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    #[validate(range(min = 1))]
    pub course_id: i64,
    #[validate(range(min = 1))]
    pub lesson_id: i64,
}

impl CreateQuestionRequest {
    pub fn content(&self) -> QuestionContent {
        QuestionContent {
            question: self.question.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
        }
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: Option<String>,
    #[validate(custom(function = validate_option_lengths))]
    pub options: Option<Vec<String>>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: Option<String>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.question.is_none() && self.options.is_none() && self.correct_answer.is_none()
    }
}

fn validate_option_lengths(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
