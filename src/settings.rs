//! Persisted settings and the analysis history ledger.
//!
//! The settings blob holds the per-provider toggles and the append-only
//! `analysis_history`. It is loaded by overlaying persisted values on
//! defaults (missing fields take defaults, unknown fields are ignored) and
//! persisted after every mutation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::JournalError;
use crate::models::AnalysisRecord;
use crate::providers::ProviderKind;

/// The persisted configuration: provider toggles plus the history ledger.
///
/// History invariant: length only increases, except on an explicit
/// `clear_history` which resets it to empty in one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Toggle for AI-powered emotion detection.
    #[serde(default = "default_enabled")]
    pub enable_emotions: bool,

    /// Toggle for AI-powered psychoanalytic insight.
    #[serde(default = "default_enabled")]
    pub enable_psychoanalysis: bool,

    /// Toggle for AI-powered personality analysis.
    #[serde(default = "default_enabled")]
    pub enable_personality: bool,

    /// Append-only sequence of analysis records, insertion order is
    /// chronological order.
    #[serde(default)]
    pub analysis_history: Vec<AnalysisRecord>,
}

fn default_enabled() -> bool {
    true
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            enable_emotions: true,
            enable_psychoanalysis: true,
            enable_personality: true,
            analysis_history: Vec::new(),
        }
    }
}

impl JournalSettings {
    /// Whether the given provider participates in an analysis run.
    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Emotions => self.enable_emotions,
            ProviderKind::Psychoanalysis => self.enable_psychoanalysis,
            ProviderKind::Personality => self.enable_personality,
        }
    }

    /// Flip a single provider toggle.
    pub fn set_enabled(&mut self, kind: ProviderKind, value: bool) {
        match kind {
            ProviderKind::Emotions => self.enable_emotions = value,
            ProviderKind::Psychoanalysis => self.enable_psychoanalysis = value,
            ProviderKind::Personality => self.enable_personality = value,
        }
    }
}

/// Key-value blob persistence for the settings.
///
/// `load` returns `Ok(None)` when nothing has been persisted yet.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<JournalSettings>>;
    fn save(&self, settings: &JournalSettings) -> Result<()>;
}

/// JSON file implementation of [`SettingsStore`].
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<JournalSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        let settings: JournalSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;

        Ok(Some(settings))
    }

    fn save(&self, settings: &JournalSettings) -> Result<()> {
        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        // Write-then-rename so the blob on disk is never half-written.
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("Failed to write state file: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Sole mutator of the settings blob.
///
/// All mutations are serialized behind one lock, applied to a working copy,
/// persisted, and committed to memory only when the save succeeds. On a
/// failed save the in-memory state is unchanged (rollback-on-failure).
pub struct SettingsManager {
    store: Box<dyn SettingsStore>,
    settings: Mutex<JournalSettings>,
}

impl SettingsManager {
    /// Load settings from the store, overlaying persisted values on defaults.
    pub fn load(store: Box<dyn SettingsStore>) -> Result<Self> {
        let settings = match store.load()? {
            Some(persisted) => {
                debug!("Loaded persisted settings");
                persisted
            }
            None => {
                debug!("No persisted settings found, using defaults");
                JournalSettings::default()
            }
        };

        Ok(Self {
            store,
            settings: Mutex::new(settings),
        })
    }

    /// A point-in-time copy of the current settings.
    pub async fn snapshot(&self) -> JournalSettings {
        self.settings.lock().await.clone()
    }

    /// Number of records currently in the history.
    pub async fn history_len(&self) -> usize {
        self.settings.lock().await.analysis_history.len()
    }

    /// Set one provider toggle and persist.
    pub async fn set_toggle(&self, kind: ProviderKind, value: bool) -> Result<(), JournalError> {
        self.mutate(|settings| {
            settings.set_enabled(kind, value);
            info!("Toggle '{}' set to {}", kind, value);
        })
        .await
    }

    /// Append a record to the history ledger and persist.
    ///
    /// Appends land in the order the calls acquire the lock, which is the
    /// order their analysis runs complete.
    pub async fn append_record(&self, record: AnalysisRecord) -> Result<(), JournalError> {
        self.mutate(|settings| {
            settings.analysis_history.push(record);
            debug!(
                "Appended analysis record, history length is now {}",
                settings.analysis_history.len()
            );
        })
        .await
    }

    /// Reset the history to empty and persist. Irreversible.
    pub async fn clear_history(&self) -> Result<(), JournalError> {
        self.mutate(|settings| {
            let removed = settings.analysis_history.len();
            settings.analysis_history.clear();
            info!("Cleared analysis history ({} records removed)", removed);
        })
        .await
    }

    /// Apply a mutation to a working copy, persist it, then commit.
    async fn mutate<F>(&self, apply: F) -> Result<(), JournalError>
    where
        F: FnOnce(&mut JournalSettings),
    {
        let mut guard = self.settings.lock().await;

        let mut working = guard.clone();
        apply(&mut working);

        self.store
            .save(&working)
            .map_err(JournalError::Persistence)?;

        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl SettingsStore for FailingStore {
        fn load(&self) -> Result<Option<JournalSettings>> {
            Ok(None)
        }

        fn save(&self, _settings: &JournalSettings) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    struct NullStore;

    impl SettingsStore for NullStore {
        fn load(&self) -> Result<Option<JournalSettings>> {
            Ok(None)
        }

        fn save(&self, _settings: &JournalSettings) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults_all_enabled_empty_history() {
        let settings = JournalSettings::default();
        assert!(settings.enable_emotions);
        assert!(settings.enable_psychoanalysis);
        assert!(settings.enable_personality);
        assert!(settings.analysis_history.is_empty());
    }

    #[test]
    fn test_overlay_partial_blob_on_defaults() {
        // Only one field persisted; the rest take defaults. Unknown fields
        // from older or newer versions are ignored.
        let blob = r#"{"enable_emotions": false, "someFutureField": 42}"#;
        let settings: JournalSettings = serde_json::from_str(blob).unwrap();

        assert!(!settings.enable_emotions);
        assert!(settings.enable_psychoanalysis);
        assert!(settings.enable_personality);
        assert!(settings.analysis_history.is_empty());
    }

    #[test]
    fn test_json_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        assert!(store.load().unwrap().is_none());

        let mut settings = JournalSettings::default();
        settings.enable_personality = false;
        settings.analysis_history.push(AnalysisRecord::now());
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert!(!loaded.enable_personality);
        assert_eq!(loaded.analysis_history.len(), 1);
    }

    #[tokio::test]
    async fn test_set_toggle_persists_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let manager = SettingsManager::load(Box::new(JsonFileStore::new(path.clone()))).unwrap();
        manager
            .set_toggle(ProviderKind::Emotions, false)
            .await
            .unwrap();

        // A fresh manager over the same file sees the change.
        let reloaded = SettingsManager::load(Box::new(JsonFileStore::new(path))).unwrap();
        assert!(!reloaded.snapshot().await.enable_emotions);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_in_memory_state() {
        let manager = SettingsManager::load(Box::new(FailingStore)).unwrap();

        let err = manager.append_record(AnalysisRecord::now()).await;
        assert!(matches!(err, Err(JournalError::Persistence(_))));

        // The record never made it into the in-memory ledger.
        assert_eq!(manager.history_len().await, 0);
        assert!(manager.snapshot().await.enable_emotions);
    }

    #[tokio::test]
    async fn test_append_preserves_order_and_clear_resets() {
        let manager = SettingsManager::load(Box::new(NullStore)).unwrap();

        let mut first = AnalysisRecord::now();
        first.psychoanalytic_response = Some("first".to_string());
        let mut second = AnalysisRecord::now();
        second.psychoanalytic_response = Some("second".to_string());

        manager.append_record(first).await.unwrap();
        manager.append_record(second).await.unwrap();

        let history = manager.snapshot().await.analysis_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].psychoanalytic_response.as_deref(), Some("first"));
        assert_eq!(history[1].psychoanalytic_response.as_deref(), Some("second"));
        assert!(history[0].timestamp <= history[1].timestamp);

        manager.clear_history().await.unwrap();
        assert_eq!(manager.history_len().await, 0);
    }
}
