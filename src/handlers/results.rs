// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::user::Caller,
    scoring::progress::{self, UserProgress},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub progress: UserProgress,
}

/// Reads a user's whole ledger and reduces it. Recomputed on every call.
pub async fn load_progress(state: &AppState, user_id: i64) -> AppResult<ProgressResponse> {
    let attempts = state.ledger.list_by_user(user_id).await?;
    let lesson_ids = progress::referenced_lessons(&attempts);
    let lessons = state.catalog.lesson_summaries(&lesson_ids).await?;

    Ok(ProgressResponse {
        message: "User results retrieved successfully",
        progress: progress::aggregate(&attempts, &lessons),
    })
}

/// Progress for any user. Learners may only read their own.
pub async fn get_user_results(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    caller.require_self_or_admin(user_id)?;

    state
        .catalog
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let progress = load_progress(&state, user_id).await?;
    Ok(Json(progress))
}
