//! Analysis provider interface.
//!
//! Providers are black-box analyzers behind a uniform async interface:
//! text in, structured-or-textual insight out. A provider either returns
//! its complete output or an error, never a partial value.

pub mod ollama;

pub use ollama::{EmotionProvider, OllamaClient, PersonalityProvider, PsychoanalysisProvider};

use anyhow::Result;
use clap::ValueEnum;
use std::fmt;

use crate::models::{EmotionScores, PersonalityInsights};

/// The fixed set of analysis providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ProviderKind {
    /// Emotion detection: emotion label -> intensity.
    Emotions,
    /// Psychoanalytic insight: free-text reflection.
    Psychoanalysis,
    /// Personality profiling: trait label -> assessment.
    Personality,
}

impl ProviderKind {
    /// All providers, in invocation order.
    pub fn all() -> [ProviderKind; 3] {
        [
            ProviderKind::Emotions,
            ProviderKind::Psychoanalysis,
            ProviderKind::Personality,
        ]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Emotions => write!(f, "emotions"),
            ProviderKind::Psychoanalysis => write!(f, "psychoanalysis"),
            ProviderKind::Personality => write!(f, "personality"),
        }
    }
}

/// Successful output of one provider call.
#[derive(Debug, Clone)]
pub enum ProviderOutput {
    Emotions(EmotionScores),
    Psychoanalysis(String),
    Personality(PersonalityInsights),
}

/// A pluggable analysis provider.
///
/// `analyze` receives the full journal text, already validated as
/// non-empty by the orchestrator. Failures (API error, timeout, malformed
/// model output) are reported as errors, never as empty success values.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Which slot of the aggregate record this provider fills.
    fn kind(&self) -> ProviderKind;

    /// Analyze the journal text.
    async fn analyze(&self, text: &str) -> Result<ProviderOutput>;
}
