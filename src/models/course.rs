// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'courses' table. Written by the course CRUD layer, read here.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub price: f64,
    pub category: String,
}

/// Represents the 'lessons' table. A lesson belongs to exactly one course.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A lesson joined with its course, as needed for progress display.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub lesson_id: i64,
    pub lesson_title: String,
    pub course_id: i64,
    pub course_title: String,
    pub course_description: String,
}
