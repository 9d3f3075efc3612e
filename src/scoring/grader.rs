// src/scoring/grader.rs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    config::PASSING_SCORE,
    error::{AppError, AppResult},
    models::question::Question,
};

pub const EMPTY_SUBMISSION: &str = "Answers must be a non-empty array";

/// One answer addressed to a specific question.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedAnswer {
    pub question_id: i64,
    pub answer: String,
}

/// A learner's answers for one lesson.
///
/// `Positional` answers are matched to the lesson's questions in creation order.
/// `Keyed` answers name their question, so a change in ordering cannot mis-grade them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Submission {
    Positional(Vec<String>),
    Keyed(Vec<KeyedAnswer>),
}

impl Submission {
    pub fn len(&self) -> usize {
        match self {
            Submission::Positional(answers) => answers.len(),
            Submission::Keyed(answers) => answers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rejects a submission without answers. Cheap enough to run before any lookup.
    pub fn ensure_not_empty(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::InvalidInput(EMPTY_SUBMISSION.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub lesson_id: i64,
    pub quiz_id: i64,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score: i32,
    pub passed: bool,
    pub details: Vec<QuestionResult>,
}

/// `round(100 * correct / total)` with halves rounded up, in integer arithmetic.
pub fn percentage(correct: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as i32
}

/// Orders questions the way answers are matched: oldest first, id breaks ties.
pub fn sort_for_grading(questions: &mut [Question]) {
    questions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Grades a submission against a lesson's questions. Pure; the caller decides
/// whether to record the result.
pub fn grade(lesson_id: i64, questions: &[Question], submission: &Submission) -> AppResult<AttemptReport> {
    submission.ensure_not_empty()?;

    let mut ordered = questions.to_vec();
    sort_for_grading(&mut ordered);

    let lead = ordered
        .first()
        .ok_or_else(|| AppError::NotFound("No quiz questions found for this lesson".to_string()))?;
    let quiz_id = lead.id;

    if submission.len() != ordered.len() {
        return Err(AppError::AnswerCountMismatch {
            expected: ordered.len(),
            received: submission.len(),
        });
    }

    let answers = match submission {
        Submission::Positional(answers) => answers.clone(),
        Submission::Keyed(answers) => match_keyed(&ordered, answers)?,
    };

    let details: Vec<QuestionResult> = ordered
        .iter()
        .zip(answers)
        .map(|(q, user_answer)| QuestionResult {
            question_id: q.id,
            question: q.question.clone(),
            options: q.options.0.clone(),
            is_correct: q.is_correct_answer(&user_answer),
            user_answer,
            correct_answer: q.correct_answer.clone(),
        })
        .collect();

    let total_questions = details.len();
    let correct_answers = details.iter().filter(|d| d.is_correct).count();
    let score = percentage(correct_answers, total_questions);

    Ok(AttemptReport {
        lesson_id,
        quiz_id,
        total_questions,
        correct_answers,
        score,
        passed: score >= PASSING_SCORE,
        details,
    })
}

/// Lines keyed answers up with `ordered`. Each question must be answered exactly once.
fn match_keyed(ordered: &[Question], answers: &[KeyedAnswer]) -> AppResult<Vec<String>> {
    let known: HashSet<i64> = ordered.iter().map(|q| q.id).collect();

    let mut by_question: HashMap<i64, &str> = HashMap::with_capacity(answers.len());
    let mut duplicates = Vec::new();
    let mut unknown = Vec::new();

    for a in answers {
        if !known.contains(&a.question_id) {
            unknown.push(a.question_id);
        } else if by_question.insert(a.question_id, &a.answer).is_some() {
            duplicates.push(a.question_id);
        }
    }

    if !unknown.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Answers reference questions outside this lesson: {:?}",
            unknown
        )));
    }
    if !duplicates.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Questions answered more than once: {:?}",
            duplicates
        )));
    }

    let missing: Vec<i64> = ordered
        .iter()
        .map(|q| q.id)
        .filter(|id| !by_question.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Missing answers for questions: {:?}",
            missing
        )));
    }

    Ok(ordered
        .iter()
        .map(|q| by_question[&q.id].to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sqlx::types::Json;

    fn question(id: i64, minutes: i64, correct: &str) -> Question {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        Question {
            id,
            lesson_id: 1,
            course_id: 1,
            question: format!("Question number {}", id),
            options: Json(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
            correct_answer: correct.to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    fn positional(answers: &[&str]) -> Submission {
        Submission::Positional(answers.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(3, 4), 75);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(7, 10), 70);
    }

    #[test]
    fn test_three_of_four_passes() {
        let questions = vec![
            question(1, 0, "A"),
            question(2, 1, "B"),
            question(3, 2, "C"),
            question(4, 3, "D"),
        ];

        let report = grade(1, &questions, &positional(&["A", "B", "X", "D"])).unwrap();
        assert_eq!(report.total_questions, 4);
        assert_eq!(report.correct_answers, 3);
        assert_eq!(report.score, 75);
        assert!(report.passed);
        assert!(!report.details[2].is_correct);
        assert_eq!(report.details[2].user_answer, "X");
        assert_eq!(report.details[2].correct_answer, "C");
        assert_eq!(report.details[2].options.len(), 4);
    }

    #[test]
    fn test_answers_follow_creation_order() {
        // Stored out of order; grading must sort by creation time.
        let questions = vec![question(9, 5, "D"), question(3, 0, "A"), question(5, 2, "B")];

        let report = grade(1, &questions, &positional(&["A", "B", "D"])).unwrap();
        assert_eq!(report.correct_answers, 3);
        assert_eq!(report.quiz_id, 3);
        let ids: Vec<i64> = report.details.iter().map(|d| d.question_id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn test_exact_match_only() {
        let questions = vec![question(1, 0, "A")];

        let report = grade(1, &questions, &positional(&["a"])).unwrap();
        assert_eq!(report.correct_answers, 0);

        let report = grade(1, &questions, &positional(&["A "])).unwrap();
        assert_eq!(report.correct_answers, 0);
        assert!(!report.passed);
    }

    #[test]
    fn test_count_mismatch() {
        let questions = vec![question(1, 0, "A")];

        let err = grade(1, &questions, &positional(&["A", "B"])).unwrap_err();
        assert!(matches!(
            err,
            AppError::AnswerCountMismatch { expected: 1, received: 2 }
        ));
    }

    #[test]
    fn test_empty_submission_is_invalid_input() {
        let questions = vec![question(1, 0, "A")];
        let err = grade(1, &questions, &positional(&[])).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == EMPTY_SUBMISSION));

        let keyed = Submission::Keyed(Vec::new());
        assert!(keyed.ensure_not_empty().is_err());
        assert!(positional(&["A"]).ensure_not_empty().is_ok());
    }

    #[test]
    fn test_no_questions_is_not_found() {
        let err = grade(1, &[], &positional(&["A"])).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_threshold_boundary() {
        let questions: Vec<Question> = (1..=10).map(|i| question(i, i, "A")).collect();

        let mut answers = vec!["A"; 7];
        answers.extend(["B"; 3]);
        let report = grade(1, &questions, &positional(&answers)).unwrap();
        assert_eq!(report.score, 70);
        assert!(report.passed);

        let mut answers = vec!["A"; 6];
        answers.extend(["B"; 4]);
        let report = grade(1, &questions, &positional(&answers)).unwrap();
        assert_eq!(report.score, 60);
        assert!(!report.passed);
    }

    #[test]
    fn test_keyed_answers_any_order() {
        let questions = vec![question(1, 0, "A"), question(2, 1, "B")];
        let submission = Submission::Keyed(vec![
            KeyedAnswer { question_id: 2, answer: "B".into() },
            KeyedAnswer { question_id: 1, answer: "C".into() },
        ]);

        let report = grade(1, &questions, &submission).unwrap();
        assert_eq!(report.correct_answers, 1);
        assert_eq!(report.score, 50);
        assert_eq!(report.details[0].question_id, 1);
        assert_eq!(report.details[0].user_answer, "C");
    }

    #[test]
    fn test_keyed_answers_rejects_unknown_and_duplicates() {
        let questions = vec![question(1, 0, "A"), question(2, 1, "B")];

        let unknown = Submission::Keyed(vec![
            KeyedAnswer { question_id: 1, answer: "A".into() },
            KeyedAnswer { question_id: 77, answer: "B".into() },
        ]);
        assert!(matches!(grade(1, &questions, &unknown), Err(AppError::InvalidInput(_))));

        let duplicate = Submission::Keyed(vec![
            KeyedAnswer { question_id: 1, answer: "A".into() },
            KeyedAnswer { question_id: 1, answer: "B".into() },
        ]);
        assert!(matches!(grade(1, &questions, &duplicate), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_submission_deserializes_both_shapes() {
        let positional: Submission = serde_json::from_str(r#"["A", "B"]"#).unwrap();
        assert!(matches!(positional, Submission::Positional(ref v) if v.len() == 2));

        let keyed: Submission =
            serde_json::from_str(r#"[{"questionId": 4, "answer": "A"}]"#).unwrap();
        assert!(matches!(keyed, Submission::Keyed(ref v) if v[0].question_id == 4));
    }
}
