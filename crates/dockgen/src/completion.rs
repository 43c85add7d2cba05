use crate::config::{ApiFlavor, CompletionConfig};
use crate::prelude::*;
use dockgen_core::completion::{
    extract_artifact, legacy_prompt, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ExtractError, LegacyCompletionRequest, LegacyCompletionResponse,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

const SYSTEM_PREAMBLE: &str = "\
You are an expert DevOps engineer who writes production-ready Dockerfiles.
You receive a description of a source-code repository and output ONLY the
contents of a Dockerfile for it. No markdown fences. No explanations.";

/// Sends prompts to an OpenAI-compatible completion API
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

/// Create an HTTP client authenticated with the completion API key
pub fn create_completion_client(config: &CompletionConfig) -> Result<reqwest::Client, Error> {
    let mut auth = HeaderValue::from_str(&f!("Bearer {}", config.api_key))
        .map_err(|e| Error::Config(f!("Invalid OPENAI_API_KEY header value: {}", e)))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Config(f!("Failed to build HTTP client: {}", e)))
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, Error> {
        let client = create_completion_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Submit the prompt and return the trimmed text of the first choice
    pub async fn generate(&self, prompt: &str) -> Result<String, Error> {
        let extracted = match self.config.api {
            ApiFlavor::Chat => {
                let request = ChatCompletionRequest {
                    model: self.config.model.clone(),
                    messages: vec![
                        ChatMessage::system(SYSTEM_PREAMBLE),
                        ChatMessage::user(prompt),
                    ],
                    max_tokens: self.config.max_tokens,
                    temperature: self.config.temperature,
                };
                let response: ChatCompletionResponse =
                    self.post("chat/completions", &request).await?;
                extract_artifact(response.first_text())
            }
            ApiFlavor::Legacy => {
                let request = LegacyCompletionRequest {
                    model: self.config.model.clone(),
                    prompt: legacy_prompt(SYSTEM_PREAMBLE, prompt),
                    max_tokens: self.config.max_tokens,
                    temperature: self.config.temperature,
                };
                let response: LegacyCompletionResponse =
                    self.post("completions", &request).await?;
                extract_artifact(response.first_text())
            }
        };

        extracted.map_err(|e| {
            match e {
                ExtractError::NoChoices => {
                    log::warn!("Model {} returned no choices", self.config.model)
                }
                ExtractError::EmptyText => {
                    log::warn!("Model {} returned an empty completion", self.config.model)
                }
            }
            Error::Generation(e.to_string())
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, Error> {
        let url = f!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                log::warn!("Completion request to {} failed: {}", url, e);
                Error::Generation(f!("Failed to send completion request: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::warn!("Completion API returned HTTP {}: {}", status, body);
            return Err(Error::Generation(f!("Completion API returned [{}]", status)));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| Error::Generation(f!("Failed to parse completion response: {}", e)))
    }
}
