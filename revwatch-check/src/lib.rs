//! # revwatch-check
//!
//! One reconciliation pass: local revision read, remote history fetch with
//! bounded retry, freshness classification, and status-message emission.
//!
//! Call [`pass::run`] to check every configured target once.

pub mod error;
pub mod freshness;
pub mod history;
pub mod local;
pub mod message;
pub mod pass;

pub use error::CheckError;
pub use pass::TargetOutcome;
