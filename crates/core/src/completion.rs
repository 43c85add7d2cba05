//! Request and response types for OpenAI-compatible completion APIs

use serde::{Deserialize, Serialize};

/// A role-tagged chat message
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /chat/completions`
#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Body of the legacy `POST /completions`
#[derive(Debug, Serialize, Clone)]
pub struct LegacyCompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LegacyCompletionResponse {
    #[serde(default)]
    pub choices: Vec<LegacyChoice>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LegacyChoice {
    #[serde(default)]
    pub text: Option<String>,
}

/// Why a completion response yielded no artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    NoChoices,
    EmptyText,
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::NoChoices => write!(f, "completion response contained no choices"),
            ExtractError::EmptyText => write!(f, "completion text was empty"),
        }
    }
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn first_text(&self) -> Option<Option<&str>> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_deref())
    }
}

impl LegacyCompletionResponse {
    /// Text of the first choice, if any
    pub fn first_text(&self) -> Option<Option<&str>> {
        self.choices.first().map(|choice| choice.text.as_deref())
    }
}

/// Turn the first choice's text into the artifact.
///
/// `first` is `None` when there were no choices and `Some(None)` when the
/// first choice had no text at all.
pub fn extract_artifact(first: Option<Option<&str>>) -> Result<String, ExtractError> {
    let text = first.ok_or(ExtractError::NoChoices)?.unwrap_or_default();
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ExtractError::EmptyText);
    }

    Ok(trimmed.to_string())
}

/// Prompt for the legacy endpoint, which has no system role
pub fn legacy_prompt(system: &str, prompt: &str) -> String {
    format!("{}\n\n{}", system, prompt)
}
