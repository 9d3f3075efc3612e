// src/scoring/progress.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::RECENT_RESULTS_LIMIT,
    models::{
        attempt::{Attempt, AttemptSummary},
        course::LessonSummary,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_quizzes_taken: usize,
    pub quizzes_passed: usize,
    pub average_score: i32,
    pub courses_started: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonResults {
    pub lesson_id: i64,
    pub lesson_name: String,
    pub best_score: i32,
    /// Newest first.
    pub attempts: Vec<AttemptSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResults {
    pub course_id: i64,
    pub course_name: String,
    pub course_description: String,
    pub lessons: BTreeMap<i64, LessonResults>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResult {
    #[serde(flatten)]
    pub attempt: AttemptSummary,
    pub lesson_id: i64,
    pub lesson_title: Option<String>,
    pub course_id: Option<i64>,
    pub course_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub stats: ProgressStats,
    pub results_by_course: BTreeMap<i64, CourseResults>,
    pub recent_results: Vec<RecentResult>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Lesson ids referenced by `attempts`, first-seen order, without repeats.
pub fn referenced_lessons(attempts: &[Attempt]) -> Vec<i64> {
    let mut seen = HashSet::new();
    attempts
        .iter()
        .map(|a| a.lesson_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Reduces a user's ledger rows (newest first) into dashboard data.
///
/// Attempts whose lesson is not in `lessons` still count towards the totals
/// but are left out of the course grouping.
pub fn aggregate(attempts: &[Attempt], lessons: &[LessonSummary]) -> UserProgress {
    let by_lesson: HashMap<i64, &LessonSummary> =
        lessons.iter().map(|l| (l.lesson_id, l)).collect();

    let mut results_by_course: BTreeMap<i64, CourseResults> = BTreeMap::new();

    for attempt in attempts {
        let Some(lesson) = by_lesson.get(&attempt.lesson_id) else {
            tracing::warn!(
                attempt_id = attempt.id,
                lesson_id = attempt.lesson_id,
                "Skipping attempt with unresolvable lesson"
            );
            continue;
        };

        let course = results_by_course
            .entry(lesson.course_id)
            .or_insert_with(|| CourseResults {
                course_id: lesson.course_id,
                course_name: lesson.course_title.clone(),
                course_description: lesson.course_description.clone(),
                lessons: BTreeMap::new(),
            });

        let entry = course
            .lessons
            .entry(lesson.lesson_id)
            .or_insert_with(|| LessonResults {
                lesson_id: lesson.lesson_id,
                lesson_name: lesson.lesson_title.clone(),
                best_score: attempt.score,
                attempts: Vec::new(),
            });

        entry.best_score = entry.best_score.max(attempt.score);
        entry.attempts.push(AttemptSummary::from(attempt));
    }

    let total = attempts.len();
    let score_sum: i64 = attempts.iter().map(|a| a.score as i64).sum();
    let average_score = if total == 0 {
        0
    } else {
        ((2 * score_sum + total as i64) / (2 * total as i64)) as i32
    };

    let stats = ProgressStats {
        total_quizzes_taken: total,
        quizzes_passed: attempts.iter().filter(|a| a.passed).count(),
        average_score,
        courses_started: results_by_course.len(),
    };

    let recent_results = attempts
        .iter()
        .take(RECENT_RESULTS_LIMIT)
        .map(|a| {
            let lesson = by_lesson.get(&a.lesson_id);
            RecentResult {
                attempt: AttemptSummary::from(a),
                lesson_id: a.lesson_id,
                lesson_title: lesson.map(|l| l.lesson_title.clone()),
                course_id: lesson.map(|l| l.course_id),
                course_title: lesson.map(|l| l.course_title.clone()),
            }
        })
        .collect();

    UserProgress {
        stats,
        results_by_course,
        recent_results,
        last_activity: last_activity(attempts),
    }
}

/// Newest attempt timestamp, if any.
pub fn last_activity(attempts: &[Attempt]) -> Option<DateTime<Utc>> {
    attempts.iter().map(|a| a.created_at).max()
}
