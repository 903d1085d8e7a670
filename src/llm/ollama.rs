//! Ollama HTTP client.
//!
//! Talks to a locally running `ollama serve`:
//! - `POST /api/chat` for completions (non-streaming)
//! - `GET /api/tags` to see which models are pulled

use crate::config::Config;
use crate::types::{Result, SqlRagError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Chat model the translation engine talks to.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one system + user prompt and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns `SqlRagError::LlmError` if the model server fails or replies
    /// with something unusable
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Model name, for logs.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Ollama chat client.
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OllamaClient {
    /// Create new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. `http://localhost:11434`
    /// * `model` - Chat model name, e.g. `llama3.1:8b`
    /// * `timeout` - Per-request timeout; `None` waits indefinitely
    pub fn new(base_url: &str, model: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: 0.1,
            client: builder.build()?,
        })
    }

    /// Create client for `LLM_MODEL` from the application config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.ollama_base_url,
            &config.llm_model,
            config.request_timeout,
        )
    }

    /// Names of the models available on the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| SqlRagError::llm(format!("Ollama server unreachable: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SqlRagError::llm(format!("Ollama API error {}: {}", status, body)));
        }

        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Which of `required` are not pulled on the server.
    pub async fn missing_models(&self, required: &[&str]) -> Result<Vec<String>> {
        let available = self.list_models().await?;
        Ok(required
            .iter()
            .filter(|wanted| !model_available(&available, wanted))
            .map(|wanted| wanted.to_string())
            .collect())
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SqlRagError::llm(format!("Ollama API request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SqlRagError::llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(SqlRagError::llm(format!("Ollama API error {}: {}", status, body)));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| SqlRagError::llm(format!("Failed to parse Ollama response: {}", e)))?;

        debug!(model = %self.model, chars = parsed.message.content.len(), "LLM reply received");
        Ok(parsed.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Match a model name against the server's tag list.
///
/// A name without a tag matches the `:latest` tag, as `ollama run` does.
pub fn model_available(available: &[String], wanted: &str) -> bool {
    available.iter().any(|name| {
        name == wanted || (!wanted.contains(':') && *name == format!("{}:latest", wanted))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_sends_chat_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "llama3.1:8b",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "system text"},
                    {"role": "user", "content": "user text"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1:8b",
                "message": {"role": "assistant", "content": "SQLQuery: SELECT 1"},
                "done": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            OllamaClient::new(&mock_server.uri(), "llama3.1:8b", Some(Duration::from_secs(5))).unwrap();
        let reply = client.complete("system text", "user text").await.unwrap();
        assert_eq!(reply, "SQLQuery: SELECT 1");
    }

    #[tokio::test]
    async fn test_complete_surfaces_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "model 'missing' not found"})),
            )
            .mount(&mock_server)
            .await;

        let client = OllamaClient::new(&mock_server.uri(), "missing", None).unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, SqlRagError::LlmError(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_missing_models() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3.1:8b"}, {"name": "nomic-embed-text:latest"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = OllamaClient::new(&mock_server.uri(), "llama3.1:8b", None).unwrap();
        let missing = client
            .missing_models(&["llama3.1:8b", "nomic-embed-text", "mxbai-embed-large"])
            .await
            .unwrap();
        assert_eq!(missing, vec!["mxbai-embed-large".to_string()]);
    }

    #[test]
    fn test_model_available() {
        let available = vec!["llama3.1:8b".to_string(), "nomic-embed-text:latest".to_string()];
        assert!(model_available(&available, "llama3.1:8b"));
        assert!(model_available(&available, "nomic-embed-text"));
        assert!(model_available(&available, "nomic-embed-text:latest"));
        assert!(!model_available(&available, "llama3.1"));
        assert!(!model_available(&available, "llama3.1:70b"));
    }
}
