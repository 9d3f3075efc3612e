// src/handlers/certificate.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::AppError,
    models::user::Caller,
    scoring::certificate::{self, CertificateDecision},
    state::AppState,
};

/// Evaluates a user's standing in a course and returns certificate data when eligible.
///
/// Nothing is persisted; every call re-evaluates and issues a fresh certificate id.
pub async fn get_certificate(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_id, course_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    caller.require_self_or_admin(user_id)?;

    let user = state
        .catalog
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let course = state
        .catalog
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lessons = state.catalog.list_lessons(course_id).await?;
    let lesson_ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
    let attempts = state.ledger.list_for_lessons(user_id, &lesson_ids).await?;

    let evaluation = certificate::evaluate(&lessons, &attempts)?;

    match certificate::decide(evaluation, &state.certificate_policy()) {
        CertificateDecision::Eligible(evaluation) => {
            let issued = certificate::issue(&user, &course, evaluation, Utc::now());
            tracing::info!(
                user_id,
                course_id,
                certificate_id = %issued.achievement.certificate_id,
                "Certificate issued"
            );

            Ok(Json(json!({
                "message": "Certificate data retrieved successfully",
                "certificate": issued,
            })))
        }
        CertificateDecision::NotEligible(reason) => Err(AppError::invalid_state(
            reason.reason,
            json!({
                "currentScore": reason.current_score,
                "requiredScore": reason.required_score,
                "lessonsCompleted": reason.lessons_completed,
                "totalLessons": reason.total_lessons,
            }),
        )),
    }
}
