use std::time::Duration;

use async_trait::async_trait;

use crate::error::{KonspektError, Result};
use crate::provider::Provider;

/// Each backend call is attempted exactly once; timeouts surface as the same
/// failure class as any other backend error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completion port: one system instruction plus one user content string
/// in, one completion text out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat-completions client. Credentials are validated at
/// construction so a missing key fails before any pipeline work starts.
pub struct ChatClient {
    http: reqwest::Client,
    api_url: &'static str,
    model: &'static str,
    api_key: String,
}

impl ChatClient {
    pub fn new(provider: &Provider) -> Result<Self> {
        let config = provider.config();
        let api_key = provider.validate_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url,
            model: config.model,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        self.model
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system_prompt,
                    },
                    {
                        "role": "user",
                        "content": user_prompt,
                    },
                ],
                "temperature": 0.3,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| KonspektError::BackendFailed {
                reason: format!("Invalid API response: {:?}", response),
            })?;

        Ok(content.trim().to_string())
    }
}
