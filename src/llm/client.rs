use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::insight::TextGenerator;
use crate::llm::types::*;
use futures::future::BoxFuture;
use log::debug;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }

    /// Builds a client from config; fails when no API key is configured.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| TrackerError::Insight("GEMINI_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key, config.gemini_model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
        };

        debug!("Calling {} with a {}-byte prompt", self.model, prompt.len());
        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(TrackerError::Insight(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;
        body.first_text()
            .map(str::to_string)
            .ok_or_else(|| TrackerError::Insight("No text in Gemini response".to_string()))
    }
}

impl TextGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.generate_text(prompt))
    }
}
