//! Core domain types and logic.

pub mod price_bar;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod strategy;
pub mod simulator;
pub mod metrics;
pub mod config_validation;
pub mod error;
