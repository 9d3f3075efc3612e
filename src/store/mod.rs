// src/store/mod.rs

//! Persistence seams. Handlers hold `Arc<dyn Trait>` so the Postgres
//! implementations can be swapped for in-memory ones in tests.

pub mod catalog;
pub mod question_store;
pub mod result_ledger;

pub use catalog::{Catalog, PgCatalog};
pub use question_store::{PgQuestionStore, QuestionStore};
pub use result_ledger::{PgResultLedger, ResultLedger};
