//! Core domain types and simulation logic.

pub mod bar;
pub mod position;
pub mod simulator;
pub mod ledger;
pub mod config_validation;
pub mod error;
