//! The analysis orchestrator.
//!
//! `run` is the whole pipeline: validate the entry, invoke every enabled
//! provider, aggregate their outputs into one timestamped record, append it
//! to the history, and persist. Provider failures abort the run before
//! anything is appended (all-or-nothing).

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::JournalError;
use crate::models::AnalysisRecord;
use crate::providers::{AnalysisProvider, ProviderOutput};
use crate::settings::SettingsManager;

/// Runs analyses and owns the only append path into the history ledger.
pub struct Orchestrator {
    settings: Arc<SettingsManager>,
    providers: Vec<Box<dyn AnalysisProvider>>,
}

impl Orchestrator {
    /// Create an orchestrator over the given providers.
    ///
    /// Providers run in registration order; disabled ones are skipped.
    pub fn new(settings: Arc<SettingsManager>, providers: Vec<Box<dyn AnalysisProvider>>) -> Self {
        Self {
            settings,
            providers,
        }
    }

    /// Analyze a journal entry and append the aggregated record.
    ///
    /// If any enabled provider fails, the whole run is aborted: no record
    /// is appended and the first failure is surfaced. No automatic retries;
    /// a failed analysis requires the user to re-trigger.
    pub async fn run(&self, text: &str) -> Result<AnalysisRecord, JournalError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(JournalError::EmptyInput);
        }

        let config = self.settings.snapshot().await;

        let mut outputs = Vec::new();
        for provider in &self.providers {
            let kind = provider.kind();
            if !config.is_enabled(kind) {
                debug!("Provider '{}' is disabled, skipping", kind);
                continue;
            }

            info!("Running '{}' provider", kind);
            match provider.analyze(trimmed).await {
                Ok(output) => outputs.push(output),
                Err(e) => return Err(JournalError::analysis_failed(kind, e)),
            }
        }

        let mut record = AnalysisRecord::now();
        for output in outputs {
            match output {
                ProviderOutput::Emotions(scores) => record.emotions = Some(scores),
                ProviderOutput::Psychoanalysis(text) => {
                    record.psychoanalytic_response = Some(text)
                }
                ProviderOutput::Personality(insights) => {
                    record.personality_insights = Some(insights)
                }
            }
        }

        self.settings.append_record(record.clone()).await?;
        info!("Analysis complete, record appended to history");

        Ok(record)
    }
}
