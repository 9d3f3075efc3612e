// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use learnwise::{
    config::Config,
    error::AppResult,
    models::{
        attempt::{Attempt, NewAttempt},
        course::{Course, Lesson, LessonSummary},
        question::{NewQuestion, Question, QuestionContent},
        user::UserProfile,
    },
    routes,
    state::AppState,
    store::{Catalog, QuestionStore, ResultLedger},
    utils::jwt::sign_jwt,
};
use sqlx::types::Json;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Rows get strictly increasing timestamps so ordering is deterministic.
fn stamp(id: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(id)
}

#[derive(Default)]
pub struct MemoryCatalog {
    users: Mutex<Vec<UserProfile>>,
    courses: Mutex<Vec<Course>>,
    lessons: Mutex<Vec<Lesson>>,
}

impl MemoryCatalog {
    pub fn add_user(&self, id: i64, name: &str, role: &str) {
        self.users.lock().unwrap().push(UserProfile {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: role.to_string(),
        });
    }

    pub fn add_course(&self, id: i64, title: &str) {
        self.courses.lock().unwrap().push(Course {
            id,
            title: title.to_string(),
            description: format!("All about {}", title),
            thumbnail: None,
            price: 0.0,
            category: "Programming".to_string(),
        });
    }

    pub fn add_lesson(&self, id: i64, course_id: i64, title: &str) {
        self.lessons.lock().unwrap().push(Lesson {
            id,
            course_id,
            title: title.to_string(),
            video_url: None,
            pdf_url: None,
            created_at: stamp(id),
        });
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn find_course(&self, id: i64) -> AppResult<Option<Course>> {
        Ok(self.courses.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn find_lesson(&self, id: i64) -> AppResult<Option<Lesson>> {
        Ok(self.lessons.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn list_lessons(&self, course_id: i64) -> AppResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.created_at, l.id));
        Ok(lessons)
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<UserProfile>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn lesson_summaries(&self, lesson_ids: &[i64]) -> AppResult<Vec<LessonSummary>> {
        let courses = self.courses.lock().unwrap();
        let lessons = self.lessons.lock().unwrap();

        Ok(lessons
            .iter()
            .filter(|l| lesson_ids.contains(&l.id))
            .filter_map(|l| {
                courses.iter().find(|c| c.id == l.course_id).map(|c| LessonSummary {
                    lesson_id: l.id,
                    lesson_title: l.title.clone(),
                    course_id: c.id,
                    course_title: c.title.clone(),
                    course_description: c.description.clone(),
                })
            })
            .collect())
    }
}

pub struct MemoryQuestionStore {
    rows: Mutex<Vec<Question>>,
    next_id: AtomicI64,
}

impl Default for MemoryQuestionStore {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryQuestionStore {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn insert(&self, question: NewQuestion) -> AppResult<Question> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = Question {
            id,
            lesson_id: question.lesson_id,
            course_id: question.course_id,
            question: question.content.question,
            options: Json(question.content.options),
            correct_answer: question.content.correct_answer,
            created_at: stamp(id),
            updated_at: stamp(id),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>> {
        Ok(self.rows.lock().unwrap().iter().find(|q| q.id == id).cloned())
    }

    async fn list_by_lesson(&self, lesson_id: i64) -> AppResult<Vec<Question>> {
        let mut rows: Vec<Question> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.lesson_id == lesson_id)
            .cloned()
            .collect();
        rows.sort_by_key(|q| (q.created_at, q.id));
        Ok(rows)
    }

    async fn replace(&self, id: i64, content: QuestionContent) -> AppResult<Option<Question>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|q| q.id == id).map(|q| {
            q.question = content.question;
            q.options = Json(content.options);
            q.correct_answer = content.correct_answer;
            q.updated_at = Utc::now();
            q.clone()
        }))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|q| q.id != id);
        Ok(rows.len() < before)
    }
}

pub struct MemoryLedger {
    rows: Mutex<Vec<Attempt>>,
    next_id: AtomicI64,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryLedger {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn newest_first(&self, keep: impl Fn(&Attempt) -> bool) -> Vec<Attempt> {
        let mut rows: Vec<Attempt> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| keep(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }
}

#[async_trait]
impl ResultLedger for MemoryLedger {
    async fn insert(&self, attempt: NewAttempt) -> AppResult<Attempt> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = Attempt {
            id,
            user_id: attempt.user_id,
            lesson_id: attempt.lesson_id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            answers: Json(attempt.answers),
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            passed: attempt.passed,
            time_taken_seconds: attempt.time_taken_seconds,
            created_at: stamp(id),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Attempt>> {
        Ok(self.newest_first(|a| a.user_id == user_id))
    }

    async fn list_for_lessons(&self, user_id: i64, lesson_ids: &[i64]) -> AppResult<Vec<Attempt>> {
        Ok(self.newest_first(|a| a.user_id == user_id && lesson_ids.contains(&a.lesson_id)))
    }

    async fn best_for_lesson(&self, user_id: i64, lesson_id: i64) -> AppResult<Option<Attempt>> {
        let rows = self.newest_first(|a| a.user_id == user_id && a.lesson_id == lesson_id);
        // newest first, so the first maximum is the newest among ties
        Ok(rows.into_iter().fold(None, |best: Option<Attempt>, a| match best {
            Some(b) if b.score >= a.score => Some(b),
            _ => Some(a),
        }))
    }

    async fn latest_for_lesson(&self, user_id: i64, lesson_id: i64) -> AppResult<Option<Attempt>> {
        Ok(self
            .newest_first(|a| a.user_id == user_id && a.lesson_id == lesson_id)
            .into_iter()
            .next())
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub catalog: Arc<MemoryCatalog>,
    pub questions: Arc<MemoryQuestionStore>,
    pub ledger: Arc<MemoryLedger>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn token(&self, user_id: i64, role: &str) -> String {
        sign_jwt(user_id, role, JWT_SECRET, 600).expect("Failed to sign token")
    }

    /// Creates a question through the admin API and returns its id.
    pub async fn create_question(
        &self,
        admin_token: &str,
        course_id: i64,
        lesson_id: i64,
        options: [&str; 4],
        correct: &str,
    ) -> i64 {
        let response = self
            .client
            .post(self.url("/api/admin/questions"))
            .bearer_auth(admin_token)
            .json(&serde_json::json!({
                "question": format!("Which one is {}?", correct),
                "options": options,
                "correctAnswer": correct,
                "courseId": course_id,
                "lessonId": lesson_id,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        body["question"]["id"].as_i64().unwrap()
    }
}

/// Spawns the app on a random port over in-memory stores.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(false).await
}

pub async fn spawn_app_with(require_all_lessons: bool) -> TestApp {
    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        require_all_lessons,
    };

    let catalog = Arc::new(MemoryCatalog::default());
    let questions = Arc::new(MemoryQuestionStore::default());
    let ledger = Arc::new(MemoryLedger::default());

    let state = AppState {
        questions: questions.clone(),
        ledger: ledger.clone(),
        catalog: catalog.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        catalog,
        questions,
        ledger,
    }
}
