// src/store/result_ledger.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    error::AppResult,
    models::attempt::{Attempt, NewAttempt},
};

/// Append-only history of graded attempts. There is no update or delete.
#[async_trait]
pub trait ResultLedger: Send + Sync {
    /// Writes one row. Callers go through [`ResultLedger::record`].
    async fn insert(&self, attempt: NewAttempt) -> AppResult<Attempt>;

    /// All attempts of a user, newest first (`created_at DESC, id DESC`).
    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Attempt>>;

    /// A user's attempts restricted to `lesson_ids`, newest first.
    async fn list_for_lessons(&self, user_id: i64, lesson_ids: &[i64]) -> AppResult<Vec<Attempt>>;

    /// Highest score on a lesson; the newest wins ties.
    async fn best_for_lesson(&self, user_id: i64, lesson_id: i64) -> AppResult<Option<Attempt>>;

    async fn latest_for_lesson(&self, user_id: i64, lesson_id: i64) -> AppResult<Option<Attempt>>;

    /// Validates the attempt, then writes it. Nothing is written on failure.
    async fn record(&self, attempt: NewAttempt) -> AppResult<Attempt> {
        attempt.validate()?;
        let stored = self.insert(attempt).await?;
        tracing::info!(
            attempt_id = stored.id,
            user_id = stored.user_id,
            lesson_id = stored.lesson_id,
            score = stored.score,
            "Attempt recorded"
        );
        Ok(stored)
    }
}

const ATTEMPT_COLUMNS: &str = "id, user_id, lesson_id, quiz_id, score, answers, total_questions, \
     correct_answers, passed, time_taken_seconds, created_at";

pub struct PgResultLedger {
    pool: PgPool,
}

impl PgResultLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultLedger for PgResultLedger {
    async fn insert(&self, attempt: NewAttempt) -> AppResult<Attempt> {
        let sql = format!(
            r#"
            INSERT INTO quiz_results
            (user_id, lesson_id, quiz_id, score, answers, total_questions, correct_answers, passed, time_taken_seconds)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        );

        let row = sqlx::query_as::<_, Attempt>(&sql)
            .bind(attempt.user_id)
            .bind(attempt.lesson_id)
            .bind(attempt.quiz_id)
            .bind(attempt.score)
            .bind(Json(attempt.answers))
            .bind(attempt.total_questions)
            .bind(attempt.correct_answers)
            .bind(attempt.passed)
            .bind(attempt.time_taken_seconds)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record quiz result: {:?}", e);
                e
            })?;

        Ok(row)
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Attempt>> {
        let sql = format!(
            "SELECT {} FROM quiz_results WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            ATTEMPT_COLUMNS
        );

        let rows = sqlx::query_as::<_, Attempt>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list results for user {}: {:?}", user_id, e);
                e
            })?;

        Ok(rows)
    }

    async fn list_for_lessons(&self, user_id: i64, lesson_ids: &[i64]) -> AppResult<Vec<Attempt>> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {} FROM quiz_results
            WHERE user_id = $1 AND lesson_id = ANY($2)
            ORDER BY created_at DESC, id DESC
            "#,
            ATTEMPT_COLUMNS
        );

        let rows = sqlx::query_as::<_, Attempt>(&sql)
            .bind(user_id)
            .bind(lesson_ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list course results for user {}: {:?}", user_id, e);
                e
            })?;

        Ok(rows)
    }

    async fn best_for_lesson(&self, user_id: i64, lesson_id: i64) -> AppResult<Option<Attempt>> {
        let sql = format!(
            r#"
            SELECT {} FROM quiz_results
            WHERE user_id = $1 AND lesson_id = $2
            ORDER BY score DESC, created_at DESC, id DESC
            LIMIT 1
            "#,
            ATTEMPT_COLUMNS
        );

        let row = sqlx::query_as::<_, Attempt>(&sql)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch best result: {:?}", e);
                e
            })?;

        Ok(row)
    }

    async fn latest_for_lesson(&self, user_id: i64, lesson_id: i64) -> AppResult<Option<Attempt>> {
        let sql = format!(
            r#"
            SELECT {} FROM quiz_results
            WHERE user_id = $1 AND lesson_id = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            ATTEMPT_COLUMNS
        );

        let row = sqlx::query_as::<_, Attempt>(&sql)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch latest result: {:?}", e);
                e
            })?;

        Ok(row)
    }
}
