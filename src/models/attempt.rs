// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::{
    config::PASSING_SCORE,
    error::{AppError, AppResult},
    scoring::grader::{AttemptReport, percentage},
};

/// One graded question inside an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub question_id: i64,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Represents the 'quiz_results' table in the database.
/// Rows are append-only: a retake is a new row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    /// Lead question of the lesson's question set when the attempt was graded.
    pub quiz_id: i64,
    pub score: i32,
    pub answers: Json<Vec<AnswerOutcome>>,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub passed: bool,
    pub time_taken_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// An attempt that has not been written yet.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub lesson_id: i64,
    pub quiz_id: i64,
    pub score: i32,
    pub answers: Vec<AnswerOutcome>,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub passed: bool,
    pub time_taken_seconds: Option<i32>,
}

impl NewAttempt {
    pub fn from_report(user_id: i64, report: &AttemptReport, time_taken_seconds: Option<i32>) -> Self {
        Self {
            user_id,
            lesson_id: report.lesson_id,
            quiz_id: report.quiz_id,
            score: report.score,
            answers: report
                .details
                .iter()
                .map(|d| AnswerOutcome {
                    question_id: d.question_id,
                    user_answer: d.user_answer.clone(),
                    correct_answer: d.correct_answer.clone(),
                    is_correct: d.is_correct,
                })
                .collect(),
            total_questions: report.total_questions as i32,
            correct_answers: report.correct_answers as i32,
            passed: report.passed,
            time_taken_seconds,
        }
    }

    /// Ledger invariants, checked before anything is written.
    pub fn validate(&self) -> AppResult<()> {
        if self.answers.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one answer is required".to_string(),
            ));
        }
        if self.total_questions < 1 {
            return Err(AppError::InvalidInput(
                "Total questions must be at least 1".to_string(),
            ));
        }
        if self.answers.len() != self.total_questions as usize {
            return Err(AppError::InvalidInput(format!(
                "Attempt lists {} answers for {} questions",
                self.answers.len(),
                self.total_questions
            )));
        }
        if self.correct_answers < 0 || self.correct_answers > self.total_questions {
            return Err(AppError::InvalidInput(
                "Correct answers must be between 0 and total questions".to_string(),
            ));
        }

        let flagged = self.answers.iter().filter(|a| a.is_correct).count();
        if flagged != self.correct_answers as usize {
            return Err(AppError::InvalidInput(format!(
                "Correct answer count {} disagrees with {} answers marked correct",
                self.correct_answers, flagged
            )));
        }

        let expected = percentage(self.correct_answers as usize, self.total_questions as usize);
        if self.score != expected {
            return Err(AppError::InvalidInput(format!(
                "Score {} does not match {}/{} correct (expected {})",
                self.score, self.correct_answers, self.total_questions, expected
            )));
        }
        if self.passed != (self.score >= PASSING_SCORE) {
            return Err(AppError::InvalidInput(
                "Pass flag disagrees with score".to_string(),
            ));
        }
        if matches!(self.time_taken_seconds, Some(t) if t < 0) {
            return Err(AppError::InvalidInput(
                "Time taken cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Compact attempt view used inside progress groupings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub id: i64,
    pub score: i32,
    pub passed: bool,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Attempt> for AttemptSummary {
    fn from(a: &Attempt) -> Self {
        Self {
            id: a.id,
            score: a.score,
            passed: a.passed,
            total_questions: a.total_questions,
            correct_answers: a.correct_answers,
            created_at: a.created_at,
        }
    }
}
