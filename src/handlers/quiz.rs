// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    handlers::results::load_progress,
    models::{
        attempt::NewAttempt,
        question::PublicQuestion,
        user::Caller,
    },
    scoring::grader::{self, AttemptReport, Submission},
    state::AppState,
    utils::json::AppJson,
};

/// DTO for submitting a quiz.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[validate(range(min = 1))]
    pub lesson_id: i64,
    pub answers: Submission,
    #[validate(range(min = 0))]
    pub time_taken_seconds: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub message: &'static str,
    pub attempt_id: i64,
    pub results: AttemptReport,
}

async fn require_lesson(state: &AppState, lesson_id: i64) -> AppResult<()> {
    state
        .catalog
        .find_lesson(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;
    Ok(())
}

/// Lists a lesson's questions in grading order, without correct answers.
pub async fn get_lesson_questions(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_lesson(&state, lesson_id).await?;

    let mut questions = state.questions.list_by_lesson(lesson_id).await?;
    grader::sort_for_grading(&mut questions);

    let questions: Vec<PublicQuestion> = questions.into_iter().map(PublicQuestion::from).collect();

    Ok(Json(json!({
        "message": "Questions retrieved successfully",
        "count": questions.len(),
        "questions": questions,
    })))
}

/// Grades a submission and appends it to the caller's ledger.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    AppJson(payload): AppJson<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    payload.answers.ensure_not_empty()?;

    require_lesson(&state, payload.lesson_id).await?;

    let questions = state.questions.list_by_lesson(payload.lesson_id).await?;
    let report = grader::grade(payload.lesson_id, &questions, &payload.answers)?;

    let attempt = state
        .ledger
        .record(NewAttempt::from_report(
            caller.user_id,
            &report,
            payload.time_taken_seconds,
        ))
        .await?;

    Ok(Json(SubmitQuizResponse {
        message: "Quiz submitted successfully",
        attempt_id: attempt.id,
        results: report,
    }))
}

/// The caller's highest-scoring attempt on a lesson.
pub async fn get_best_attempt(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = state
        .ledger
        .best_for_lesson(caller.user_id, lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No attempts found for this lesson".to_string()))?;

    Ok(Json(attempt))
}

/// The caller's most recent attempt on a lesson.
pub async fn get_latest_attempt(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = state
        .ledger
        .latest_for_lesson(caller.user_id, lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No attempts found for this lesson".to_string()))?;

    Ok(Json(attempt))
}

/// Dashboard data for the caller.
pub async fn get_my_results(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, AppError> {
    let progress = load_progress(&state, caller.user_id).await?;
    Ok(Json(progress))
}
