//! Error taxonomy for the analysis pipeline.
//!
//! Every error that can cross a command boundary lives here. The binary
//! converts these into user-facing notices; nothing in the pipeline panics.

use thiserror::Error;

use crate::providers::ProviderKind;

/// Errors surfaced by the journal analysis pipeline.
#[derive(Debug, Error)]
pub enum JournalError {
    /// No active document, or the entry is empty after trimming.
    #[error("journal entry is empty. Please write something first")]
    EmptyInput,

    /// A single provider call failed (API error, timeout, malformed output).
    #[error("provider '{provider}' failed: {source}")]
    Provider {
        provider: ProviderKind,
        #[source]
        source: anyhow::Error,
    },

    /// The whole analysis was aborted because an enabled provider failed.
    /// No record is appended in this case.
    #[error("analysis failed: {0}")]
    AnalysisFailed(#[source] Box<JournalError>),

    /// Persisting the settings blob failed. In-memory state is rolled back.
    #[error("failed to persist settings: {0}")]
    Persistence(#[source] anyhow::Error),

    /// Writing the export document failed. History is untouched.
    #[error("failed to export analysis history: {0}")]
    Export(#[source] anyhow::Error),

    /// Export was requested on an empty history.
    #[error("no analysis history to export")]
    NothingToExport,
}

impl JournalError {
    /// Wrap a provider failure into the aborting analysis error.
    pub fn analysis_failed(provider: ProviderKind, source: anyhow::Error) -> Self {
        JournalError::AnalysisFailed(Box::new(JournalError::Provider { provider, source }))
    }
}
