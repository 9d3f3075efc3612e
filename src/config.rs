// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Minimum percentage for a passed attempt and for certificate eligibility.
pub const PASSING_SCORE: i32 = 70;

/// Number of attempts shown in the dashboard's "recent results" list.
pub const RECENT_RESULTS_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    /// When set, a certificate also requires an attempt on every lesson of the course.
    pub require_all_lessons: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let require_all_lessons = env::var("CERTIFICATE_REQUIRE_ALL_LESSONS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            require_all_lessons,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
