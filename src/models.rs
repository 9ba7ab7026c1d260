//! Data models for journal analysis.
//!
//! This module contains the core data structures for aggregated analysis
//! results and the append-only history they live in.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emotion label mapped to an intensity in `[0.0, 1.0]`.
///
/// A `BTreeMap` keeps rendering and serialization deterministic.
pub type EmotionScores = BTreeMap<String, f64>;

/// Personality trait label mapped to the provider's assessment of it.
pub type PersonalityInsights = BTreeMap<String, String>;

/// One aggregated analysis outcome.
///
/// Built by the orchestrator from the outputs of the enabled providers and
/// appended to the history exactly once. Immutable after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// When the analysis completed (stored as RFC 3339 / ISO-8601).
    pub timestamp: DateTime<Utc>,

    /// Detected emotions, absent when the emotions provider was disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<EmotionScores>,

    /// Free-text psychoanalytic reflection, absent when disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psychoanalytic_response: Option<String>,

    /// Personality trait insights, absent when disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality_insights: Option<PersonalityInsights>,
}

impl AnalysisRecord {
    /// Creates an empty record stamped with the current time.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            emotions: None,
            psychoanalytic_response: None,
            personality_insights: None,
        }
    }

    /// The timestamp in the local display form used by report headings.
    pub fn local_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// True when no provider contributed to this record (all were disabled).
    pub fn is_blank(&self) -> bool {
        self.emotions.is_none()
            && self.psychoanalytic_response.is_none()
            && self.personality_insights.is_none()
    }
}
