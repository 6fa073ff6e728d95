use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::ChatError;

/// Proxies security questions to the backend chat endpoint.
#[derive(Clone)]
pub struct ChatService {
    client: Client,
    config: ApiConfig,
}

impl ChatService {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    /// Ask a question and get the chatbot's answer.
    ///
    /// # Errors
    ///
    /// Returns `ChatError` when the prompt is blank, the request fails, or
    /// the response is empty.
    pub async fn ask(&self, prompt: &str) -> Result<String, ChatError> {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let response = self
            .client
            .post(self.config.endpoint("/api/chat"))
            .json(&ChatRequest { prompt })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let answer = body.response.unwrap_or_default();
        if answer.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(answer.trim().to_owned())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}
