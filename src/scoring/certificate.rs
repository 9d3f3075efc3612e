// src/scoring/certificate.rs

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::{
    config::PASSING_SCORE,
    error::{AppError, AppResult},
    models::{
        attempt::Attempt,
        course::{Course, Lesson},
        user::UserProfile,
    },
};

/// Rules applied when deciding eligibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CertificatePolicy {
    pub passing_score: f64,
    /// Strict mode: every lesson of the course needs at least one attempt.
    pub require_all_lessons: bool,
}

impl Default for CertificatePolicy {
    fn default() -> Self {
        Self {
            passing_score: PASSING_SCORE as f64,
            require_all_lessons: false,
        }
    }
}

/// Best-per-lesson scores for one user and course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEvaluation {
    /// Lesson id -> best score. Only attempted lessons appear.
    pub lesson_scores: BTreeMap<i64, i32>,
    pub overall_score: f64,
    pub lessons_completed: usize,
    pub total_lessons: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ineligibility {
    pub reason: String,
    pub current_score: f64,
    pub required_score: f64,
    pub lessons_completed: usize,
    pub total_lessons: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateCourse {
    pub id: i64,
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub score: f64,
    pub completion_date: DateTime<Utc>,
    pub lessons_completed: usize,
    pub total_lessons: usize,
    pub certificate_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub user: CertificateUser,
    pub course: CertificateCourse,
    pub achievement: Achievement,
    pub lesson_scores: BTreeMap<i64, i32>,
}

#[derive(Debug, Clone)]
pub enum CertificateDecision {
    Eligible(CourseEvaluation),
    NotEligible(Ineligibility),
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes best-per-lesson scores over the course's lessons.
///
/// Attempts on lessons outside `lessons` are ignored. Fails with `InvalidState`
/// when the course has no lessons or the user has no attempt on any of them.
pub fn evaluate(lessons: &[Lesson], attempts: &[Attempt]) -> AppResult<CourseEvaluation> {
    if lessons.is_empty() {
        return Err(AppError::invalid_state(
            "No lessons found for this course",
            json!({ "lessonsCompleted": 0, "totalLessons": 0 }),
        ));
    }

    let course_lessons: HashSet<i64> = lessons.iter().map(|l| l.id).collect();
    let mut lesson_scores: BTreeMap<i64, i32> = BTreeMap::new();

    for attempt in attempts.iter().filter(|a| course_lessons.contains(&a.lesson_id)) {
        lesson_scores
            .entry(attempt.lesson_id)
            .and_modify(|best| *best = (*best).max(attempt.score))
            .or_insert(attempt.score);
    }

    if lesson_scores.is_empty() {
        return Err(AppError::invalid_state(
            "User has not taken any quizzes for this course",
            json!({ "lessonsCompleted": 0, "totalLessons": lessons.len() }),
        ));
    }

    let sum: i64 = lesson_scores.values().map(|s| *s as i64).sum();
    let mean = sum as f64 / lesson_scores.len() as f64;

    Ok(CourseEvaluation {
        lessons_completed: lesson_scores.len(),
        total_lessons: lessons.len(),
        overall_score: round2(mean),
        lesson_scores,
    })
}

/// Applies `policy` to an evaluation.
pub fn decide(evaluation: CourseEvaluation, policy: &CertificatePolicy) -> CertificateDecision {
    let not_eligible = |reason: &str| Ineligibility {
        reason: reason.to_string(),
        current_score: evaluation.overall_score,
        required_score: policy.passing_score,
        lessons_completed: evaluation.lessons_completed,
        total_lessons: evaluation.total_lessons,
    };

    if evaluation.overall_score < policy.passing_score {
        return CertificateDecision::NotEligible(not_eligible("User has not passed this course"));
    }
    if policy.require_all_lessons && evaluation.lessons_completed < evaluation.total_lessons {
        return CertificateDecision::NotEligible(not_eligible(
            "Every lesson in the course must be attempted",
        ));
    }

    CertificateDecision::Eligible(evaluation)
}

/// `CERT-<user>-<course>-<unix millis>`, ids reduced to their last six digits.
pub fn certificate_id(user_id: i64, course_id: i64, issued_at: DateTime<Utc>) -> String {
    format!(
        "CERT-{:06}-{:06}-{}",
        user_id.rem_euclid(1_000_000),
        course_id.rem_euclid(1_000_000),
        issued_at.timestamp_millis()
    )
}

pub fn issue(
    user: &UserProfile,
    course: &Course,
    evaluation: CourseEvaluation,
    issued_at: DateTime<Utc>,
) -> Certificate {
    Certificate {
        user: CertificateUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        },
        course: CertificateCourse {
            id: course.id,
            title: course.title.clone(),
            category: course.category.clone(),
        },
        achievement: Achievement {
            score: evaluation.overall_score,
            completion_date: issued_at,
            lessons_completed: evaluation.lessons_completed,
            total_lessons: evaluation.total_lessons,
            certificate_id: certificate_id(user.id, course.id, issued_at),
        },
        lesson_scores: evaluation.lesson_scores,
    }
}
