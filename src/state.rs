// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    config::Config,
    scoring::certificate::CertificatePolicy,
    store::{Catalog, PgCatalog, PgQuestionStore, PgResultLedger, QuestionStore, ResultLedger},
};

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<dyn QuestionStore>,
    pub ledger: Arc<dyn ResultLedger>,
    pub catalog: Arc<dyn Catalog>,
    pub config: Config,
}

impl AppState {
    /// Wires the Postgres-backed stores onto one shared pool.
    pub fn postgres(pool: PgPool, config: Config) -> Self {
        Self {
            questions: Arc::new(PgQuestionStore::new(pool.clone())),
            ledger: Arc::new(PgResultLedger::new(pool.clone())),
            catalog: Arc::new(PgCatalog::new(pool)),
            config,
        }
    }

    pub fn certificate_policy(&self) -> CertificatePolicy {
        CertificatePolicy {
            require_all_lessons: self.config.require_all_lessons,
            ..CertificatePolicy::default()
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
