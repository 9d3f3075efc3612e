// src/handlers/mod.rs

pub mod admin;
pub mod certificate;
pub mod health;
pub mod quiz;
pub mod results;
