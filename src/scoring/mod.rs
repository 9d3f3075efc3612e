// src/scoring/mod.rs

//! Pure scoring engine: grading, progress aggregation and certificate decisions.
//! Nothing in here touches storage.

pub mod certificate;
pub mod grader;
pub mod progress;
