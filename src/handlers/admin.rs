// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, UpdateQuestionRequest},
    state::AppState,
    store::question_store,
    utils::json::AppJson,
};

/// Creates a new quiz question.
pub async fn create_question(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let question = question_store::create_question(
        state.questions.as_ref(),
        state.catalog.as_ref(),
        payload.lesson_id,
        payload.course_id,
        payload.content(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Question created successfully",
            "question": question,
        })),
    ))
}

/// Fetches a question by ID, including its correct answer.
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(json!({
        "message": "Question retrieved successfully",
        "question": question,
    })))
}

/// Updates a question by ID. Absent fields keep their stored value.
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let question = question_store::update_question(state.questions.as_ref(), id, &payload).await?;

    Ok(Json(json!({
        "message": "Question updated successfully",
        "question": question,
    })))
}

/// Deletes a quiz question by ID.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    question_store::delete_question(state.questions.as_ref(), id).await?;

    Ok(Json(json!({ "message": "Question deleted successfully" })))
}
