//! Ollama-backed analysis providers.
//!
//! All three providers share one HTTP client and talk to the Ollama
//! `/api/chat` endpoint with a non-streaming request. The structured
//! providers (emotions, personality) demand strict JSON from the model and
//! treat anything unparsable as a provider failure.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::{EmotionScores, PersonalityInsights};
use crate::providers::{AnalysisProvider, ProviderKind, ProviderOutput};

/// Chat message for the Ollama API.
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Shared client for the Ollama chat API.
#[derive(Clone)]
pub struct OllamaClient {
    http_client: reqwest::Client,
    ollama_url: String,
    model_name: String,
    temperature: f32,
    timeout_seconds: u64,
}

impl OllamaClient {
    /// Create a client for the given endpoint and model.
    pub fn new(ollama_url: String, model_name: String, temperature: f32, timeout_seconds: u64) -> Self {
        info!(
            "Initializing Ollama client with model {} at {}",
            model_name, ollama_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            ollama_url,
            model_name,
            temperature,
            timeout_seconds,
        }
    }

    /// Send a system + user prompt and return the model's text response.
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.ollama_url);

        let request = OllamaChatRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to Ollama at {}", self.ollama_url)
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(chat_response.message.content)
    }
}

/// Extract the outermost JSON object from a (possibly chatty) model reply.
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&response[start..=end])
}

/// Parse an emotion-label -> intensity mapping from a model reply.
fn parse_emotion_scores(response: &str) -> Result<EmotionScores> {
    let json = extract_json_object(response)
        .context("No JSON object found in emotion analysis response")?;

    let value: Value =
        serde_json::from_str(json).context("Emotion analysis response is not valid JSON")?;

    let object = value
        .as_object()
        .context("Emotion analysis response is not a JSON object")?;

    let mut scores = BTreeMap::new();
    for (label, score) in object {
        if let Some(intensity) = score.as_f64() {
            scores.insert(label.to_lowercase(), intensity.clamp(0.0, 1.0));
        }
    }

    if scores.is_empty() {
        return Err(anyhow::anyhow!(
            "Emotion analysis response contained no numeric scores"
        ));
    }

    Ok(scores)
}

/// Parse a trait-label -> assessment mapping from a model reply.
fn parse_personality_insights(response: &str) -> Result<PersonalityInsights> {
    let json = extract_json_object(response)
        .context("No JSON object found in personality analysis response")?;

    let value: Value =
        serde_json::from_str(json).context("Personality analysis response is not valid JSON")?;

    let object = value
        .as_object()
        .context("Personality analysis response is not a JSON object")?;

    let mut insights = BTreeMap::new();
    for (label, assessment) in object {
        let text = match assessment {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            // Nested structures are not part of the contract; skip them.
            _ => continue,
        };
        insights.insert(label.to_lowercase(), text);
    }

    if insights.is_empty() {
        return Err(anyhow::anyhow!(
            "Personality analysis response contained no trait assessments"
        ));
    }

    Ok(insights)
}

const EMOTION_SYSTEM_PROMPT: &str = r#"You are an expert in emotion detection.
Analyze the journal entry and output ONLY a JSON object mapping emotion labels
to intensities between 0.0 and 1.0, for example {"joy": 0.8, "anxiety": 0.3}.
Include only emotions that are actually present. No explanations, no markdown."#;

const PSYCHOANALYSIS_SYSTEM_PROMPT: &str = r#"You are a thoughtful psychoanalyst.
Read the journal entry and respond with a short reflective insight (2-4
sentences) about the writer's inner state, written directly to the writer.
Plain text only, no headings or lists."#;

const PERSONALITY_SYSTEM_PROMPT: &str = r#"You are an expert in personality
profiling. Analyze the journal entry and output ONLY a JSON object mapping
personality trait labels to short assessments, for example
{"openness": "high", "conscientiousness": "moderate"}.
No explanations, no markdown."#;

/// Emotion detection provider.
pub struct EmotionProvider {
    client: OllamaClient,
}

impl EmotionProvider {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for EmotionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Emotions
    }

    async fn analyze(&self, text: &str) -> Result<ProviderOutput> {
        debug!("Requesting emotion analysis ({} chars)", text.len());
        let response = self.client.generate(EMOTION_SYSTEM_PROMPT, text).await?;
        let scores = parse_emotion_scores(&response)?;
        Ok(ProviderOutput::Emotions(scores))
    }
}

/// Psychoanalytic insight provider.
pub struct PsychoanalysisProvider {
    client: OllamaClient,
}

impl PsychoanalysisProvider {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for PsychoanalysisProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Psychoanalysis
    }

    async fn analyze(&self, text: &str) -> Result<ProviderOutput> {
        debug!("Requesting psychoanalytic insight ({} chars)", text.len());
        let response = self
            .client
            .generate(PSYCHOANALYSIS_SYSTEM_PROMPT, text)
            .await?;

        let insight = response.trim().to_string();
        if insight.is_empty() {
            return Err(anyhow::anyhow!("Psychoanalysis response was empty"));
        }

        Ok(ProviderOutput::Psychoanalysis(insight))
    }
}

/// Personality profiling provider.
pub struct PersonalityProvider {
    client: OllamaClient,
}

impl PersonalityProvider {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for PersonalityProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Personality
    }

    async fn analyze(&self, text: &str) -> Result<ProviderOutput> {
        debug!("Requesting personality analysis ({} chars)", text.len());
        let response = self.client.generate(PERSONALITY_SYSTEM_PROMPT, text).await?;
        let insights = parse_personality_insights(&response)?;
        Ok(ProviderOutput::Personality(insights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_response() {
        let response = "Here you go:\n```json\n{\"joy\": 0.8}\n```\nHope that helps!";
        assert_eq!(extract_json_object(response), Some("{\"joy\": 0.8}"));
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }

    #[test]
    fn test_parse_emotion_scores() {
        let scores = parse_emotion_scores(r#"{"Joy": 0.8, "anxiety": 0.25}"#).unwrap();
        assert_eq!(scores.get("joy"), Some(&0.8));
        assert_eq!(scores.get("anxiety"), Some(&0.25));
    }

    #[test]
    fn test_parse_emotion_scores_clamps_out_of_range() {
        let scores = parse_emotion_scores(r#"{"joy": 1.7, "grief": -0.2}"#).unwrap();
        assert_eq!(scores.get("joy"), Some(&1.0));
        assert_eq!(scores.get("grief"), Some(&0.0));
    }

    #[test]
    fn test_parse_emotion_scores_rejects_non_numeric() {
        assert!(parse_emotion_scores(r#"{"dominant": "joy"}"#).is_err());
        assert!(parse_emotion_scores("total garbage").is_err());
        assert!(parse_emotion_scores(r#"[0.1, 0.2]"#).is_err());
    }

    #[test]
    fn test_parse_personality_insights() {
        let insights = parse_personality_insights(
            r#"{"Openness": "high", "neuroticism": 0.4, "nested": {"x": 1}}"#,
        )
        .unwrap();

        assert_eq!(insights.get("openness").map(String::as_str), Some("high"));
        assert_eq!(insights.get("neuroticism").map(String::as_str), Some("0.4"));
        assert!(!insights.contains_key("nested"));
    }

    #[test]
    fn test_parse_personality_insights_rejects_empty() {
        assert!(parse_personality_insights(r#"{"nested": {"x": 1}}"#).is_err());
        assert!(parse_personality_insights("no json").is_err());
    }
}
