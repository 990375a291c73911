//! Anthropic-backed enrichment provider.
//!
//! The only module that talks to the Anthropic API. Wraps the Messages
//! endpoint with retry logic and a JSON-only output contract; any failure
//! surfaces as a [`ProviderError`] and is absorbed by the extraction
//! fallback path.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ProviderError;
use crate::extraction::prompts::{EXTRACT_PROMPT_TEMPLATE, EXTRACT_SYSTEM};
use crate::extraction::provider::{ExtractionProvider, ProviderFields};
use crate::models::posting::CanonicalText;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Hardcoded to prevent accidental drift between environments.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl MessagesResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

/// Enrichment provider backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Raw call with retry on 429/5xx (exponential backoff: 1s, 2s, 4s).
    async fn call(&self, prompt: &str) -> Result<MessagesResponse, ProviderError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: EXTRACT_SYSTEM,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Enrichment call attempt {attempt} failed, retrying after {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ProviderError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Enrichment API returned {status}: {message}");
                last_error = Some(ProviderError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return response.json().await.map_err(ProviderError::Http);
        }

        Err(last_error.unwrap_or(ProviderError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ExtractionProvider for AnthropicProvider {
    async fn submit(&self, canon: &CanonicalText) -> Result<ProviderFields, ProviderError> {
        let prompt = EXTRACT_PROMPT_TEMPLATE.replace("{posting_text}", &canon.display_text);
        let response = self.call(&prompt).await?;
        let text = response.text().ok_or(ProviderError::EmptyContent)?;
        let fields: ProviderFields = serde_json::from_str(strip_json_fences(text))?;
        debug!("Enrichment succeeded via {}", self.name());
        Ok(fields)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    for prefix in ["```json", "```"] {
        if let Some(stripped) = text.strip_prefix(prefix) {
            return stripped
                .trim_start()
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or_else(|| stripped.trim_start());
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let response = MessagesResponse {
            content: vec![
                ContentBlock {
                    block_type: "thinking".to_string(),
                    text: None,
                },
                ContentBlock {
                    block_type: "text".to_string(),
                    text: Some("{}".to_string()),
                },
            ],
        };
        assert_eq!(response.text(), Some("{}"));
    }
}
