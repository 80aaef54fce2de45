//! Core domain types and logic.

pub mod cache;
pub mod config_validation;
pub mod crosses;
pub mod error;
pub mod indicator;
pub mod position;
pub mod price_series;
pub mod rule;
pub mod rule_eval;
pub mod simulation;
pub mod stats;
pub mod synthetic;
