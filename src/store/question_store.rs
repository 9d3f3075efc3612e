// src/store/question_store.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    error::{AppError, AppResult},
    models::question::{NewQuestion, Question, QuestionContent, UpdateQuestionRequest},
    store::catalog::Catalog,
    utils::html::clean_html,
};

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn insert(&self, question: NewQuestion) -> AppResult<Question>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>>;
    /// Questions of a lesson, oldest first with id breaking ties.
    async fn list_by_lesson(&self, lesson_id: i64) -> AppResult<Vec<Question>>;
    /// Overwrites the content of an existing question. `None` if it does not exist.
    async fn replace(&self, id: i64, content: QuestionContent) -> AppResult<Option<Question>>;
    /// Returns `false` if nothing was deleted.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

fn sanitize(mut content: QuestionContent) -> QuestionContent {
    content.question = clean_html(&content.question);
    content
}

/// Validates a draft against the shared content rule and the catalog, then inserts it.
pub async fn create_question(
    questions: &dyn QuestionStore,
    catalog: &dyn Catalog,
    lesson_id: i64,
    course_id: i64,
    content: QuestionContent,
) -> AppResult<Question> {
    let content = sanitize(content);
    content.validate()?;

    catalog
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lesson = catalog
        .find_lesson(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

    if lesson.course_id != course_id {
        return Err(AppError::InvalidInput(format!(
            "Lesson {} does not belong to course {}",
            lesson_id, course_id
        )));
    }

    let question = questions
        .insert(NewQuestion {
            lesson_id,
            course_id,
            content,
        })
        .await?;

    tracing::info!(question_id = question.id, lesson_id, "Question created");
    Ok(question)
}

/// Merges `patch` onto the stored question and re-validates the result.
/// Concurrent updates are last-writer-wins.
pub async fn update_question(
    questions: &dyn QuestionStore,
    id: i64,
    patch: &UpdateQuestionRequest,
) -> AppResult<Question> {
    let current = questions
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if patch.is_empty() {
        return Ok(current);
    }

    let merged = sanitize(current.content().merge(patch));
    merged.validate()?;

    let updated = questions
        .replace(id, merged)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    tracing::info!(question_id = id, "Question updated");
    Ok(updated)
}

pub async fn delete_question(questions: &dyn QuestionStore, id: i64) -> AppResult<()> {
    if !questions.delete(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }
    tracing::info!(question_id = id, "Question deleted");
    Ok(())
}

const QUESTION_COLUMNS: &str =
    "id, lesson_id, course_id, question, options, correct_answer, created_at, updated_at";

pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn insert(&self, question: NewQuestion) -> AppResult<Question> {
        let sql = format!(
            r#"
            INSERT INTO questions (lesson_id, course_id, question, options, correct_answer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );

        let row = sqlx::query_as::<_, Question>(&sql)
            .bind(question.lesson_id)
            .bind(question.course_id)
            .bind(question.content.question)
            .bind(Json(question.content.options))
            .bind(question.content.correct_answer)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create question: {:?}", e);
                e
            })?;

        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>> {
        let sql = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);

        let row = sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch question {}: {:?}", id, e);
                e
            })?;

        Ok(row)
    }

    async fn list_by_lesson(&self, lesson_id: i64) -> AppResult<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE lesson_id = $1 ORDER BY created_at ASC, id ASC",
            QUESTION_COLUMNS
        );

        let rows = sqlx::query_as::<_, Question>(&sql)
            .bind(lesson_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list questions for lesson {}: {:?}", lesson_id, e);
                e
            })?;

        Ok(rows)
    }

    async fn replace(&self, id: i64, content: QuestionContent) -> AppResult<Option<Question>> {
        let sql = format!(
            r#"
            UPDATE questions
            SET question = $1, options = $2, correct_answer = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );

        let row = sqlx::query_as::<_, Question>(&sql)
            .bind(content.question)
            .bind(Json(content.options))
            .bind(content.correct_answer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update question {}: {:?}", id, e);
                e
            })?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete question {}: {:?}", id, e);
                e
            })?;

        Ok(result.rows_affected() > 0)
    }
}
