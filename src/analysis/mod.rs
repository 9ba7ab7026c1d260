//! Analysis orchestration.
//!
//! Ties the configured providers, the settings store, and the history
//! ledger together into the single trigger-to-record pipeline.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
