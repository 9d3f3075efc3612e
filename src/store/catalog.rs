// src/store/catalog.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{
        course::{Course, Lesson, LessonSummary},
        user::UserProfile,
    },
};

/// Read-only view of the rows owned by the course and account layers.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_course(&self, id: i64) -> AppResult<Option<Course>>;
    async fn find_lesson(&self, id: i64) -> AppResult<Option<Lesson>>;
    /// Lessons of a course, oldest first.
    async fn list_lessons(&self, course_id: i64) -> AppResult<Vec<Lesson>>;
    async fn find_user(&self, id: i64) -> AppResult<Option<UserProfile>>;
    /// Lesson + course titles for the given lesson ids. Unknown ids are omitted.
    async fn lesson_summaries(&self, lesson_ids: &[i64]) -> AppResult<Vec<LessonSummary>>;
}

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn find_course(&self, id: i64) -> AppResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, thumbnail, price, category FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch course {}: {:?}", id, e);
            e
        })?;

        Ok(course)
    }

    async fn find_lesson(&self, id: i64) -> AppResult<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(
            "SELECT id, course_id, title, video_url, pdf_url, created_at FROM lessons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch lesson {}: {:?}", id, e);
            e
        })?;

        Ok(lesson)
    }

    async fn list_lessons(&self, course_id: i64) -> AppResult<Vec<Lesson>> {
        let lessons = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, course_id, title, video_url, pdf_url, created_at
            FROM lessons
            WHERE course_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list lessons for course {}: {:?}", course_id, e);
            e
        })?;

        Ok(lessons)
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, email, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user {}: {:?}", id, e);
            e
        })?;

        Ok(user)
    }

    async fn lesson_summaries(&self, lesson_ids: &[i64]) -> AppResult<Vec<LessonSummary>> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, LessonSummary>(
            r#"
            SELECT
                l.id AS lesson_id,
                l.title AS lesson_title,
                c.id AS course_id,
                c.title AS course_title,
                c.description AS course_description
            FROM lessons l
            JOIN courses c ON c.id = l.course_id
            WHERE l.id = ANY($1)
            "#,
        )
        .bind(lesson_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve lesson summaries: {:?}", e);
            e
        })?;

        Ok(rows)
    }
}
