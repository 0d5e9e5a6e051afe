//! Unified model gateway over the OpenRouter chat completions API
//!
//! Streams responses as SSE: each `data:` line carries a JSON chunk with a
//! `choices[0].delta.content` fragment; the final chunk before `[DONE]`
//! carries the usage accounting when usage reporting is requested.

use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, ModelStreamEvent, StreamHandle,
};
use council_domain::{ModelId, TokenUsage};
use futures::{StreamExt, TryStreamExt};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Connection settings for the unified gateway
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    /// Sent as `HTTP-Referer` for gateway-side attribution.
    pub referer: String,
    /// Sent as `X-Title` for gateway-side attribution.
    pub title: String,
    pub max_tokens: u32,
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            referer: "https://aspendos.net".to_string(),
            title: "Aspendos AI".to_string(),
            max_tokens: 8192,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// [`LlmGateway`] implementation backed by OpenRouter
#[derive(Debug)]
pub struct OpenRouterGateway {
    client: reqwest::Client,
    config: Arc<OpenRouterConfig>,
}

impl OpenRouterGateway {
    pub fn new(config: OpenRouterConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::ConnectionError(
                "Missing API key for the model gateway".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn create_session(
        &self,
        model: &ModelId,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenRouterSession {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            model: model.clone(),
            system_prompt: system_prompt.to_string(),
        }))
    }
}

struct OpenRouterSession {
    client: reqwest::Client,
    config: Arc<OpenRouterConfig>,
    model: ModelId,
    system_prompt: String,
}

#[async_trait]
impl LlmSession for OpenRouterSession {
    fn model(&self) -> &ModelId {
        &self.model
    }

    async fn send_streaming(&self, content: &str) -> Result<StreamHandle, GatewayError> {
        let body = json!({
            "model": self.model.as_str(),
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": content },
            ],
            "stream": true,
            "max_tokens": self.config.max_tokens,
            "usage": { "include": true },
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                404 => GatewayError::ModelNotAvailable(self.model.as_str().to_string()),
                _ => GatewayError::RequestFailed(format!("{status}: {error_body}")),
            });
        }

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let byte_stream = response.bytes_stream().map_err(std::io::Error::other);
        tokio::spawn(async move {
            let mut lines = FramedRead::new(StreamReader::new(byte_stream), LinesCodec::new());
            let mut usage = TokenUsage::default();

            while let Some(line) = lines.next().await {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        let _ = tx.send(ModelStreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data.trim() == "[DONE]" {
                    break;
                }
                let chunk: Value = match serde_json::from_str(data) {
                    Ok(value) => value,
                    Err(e) => {
                        debug!(error = %e, "Skipping unparseable stream chunk");
                        continue;
                    }
                };

                if let Some(message) = chunk["error"]["message"].as_str() {
                    let _ = tx.send(ModelStreamEvent::Error(message.to_string())).await;
                    return;
                }

                if let Some(delta) = chunk["choices"][0]["delta"]["content"].as_str()
                    && !delta.is_empty()
                {
                    if tx
                        .send(ModelStreamEvent::Delta(delta.to_string()))
                        .await
                        .is_err()
                    {
                        // Receiver gone, stop pulling from upstream.
                        return;
                    }
                }

                if let Some(reported) = chunk.get("usage") {
                    usage = TokenUsage::new(
                        reported["prompt_tokens"].as_u64().unwrap_or(0),
                        reported["completion_tokens"].as_u64().unwrap_or(0),
                    );
                }
            }

            if tx.send(ModelStreamEvent::Completed { usage }).await.is_err() {
                warn!("Stream consumer dropped before completion event");
            }
        });

        Ok(StreamHandle::new(rx))
    }
}
