//! Core domain types and simulation logic.

pub mod bar;
pub mod timeframe;
pub mod baseline;
pub mod series;
pub mod extension;
pub mod reclamation;
pub mod signal;
pub mod conflict;
pub mod target;
pub mod trade;
pub mod simulator;
pub mod analyzer;
pub mod config;
pub mod config_validation;
pub mod run;
pub mod error;
