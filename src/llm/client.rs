use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::Error;
use crate::llm::LlmClient;

/// `LlmClient` over HTTP, speaking either the OpenAI Responses API or the
/// Ollama chat API depending on `config.provider`.
pub struct HttpLlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    /// None when the configured provider is "none" or unknown.
    pub fn from_config(client: reqwest::Client, config: LlmConfig) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }
        Some(Self { client, config })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, instructions: &str, input: &str) -> crate::error::Result<String> {
        let result = match self.config.provider.as_str() {
            "openai" => call_openai(&self.client, &self.config, instructions, input).await,
            "ollama" => call_ollama(&self.client, &self.config, instructions, input).await,
            other => Err(anyhow::anyhow!("Unknown LLM provider: {other}")),
        };
        result.map_err(|e| Error::SuggestionUnavailable(format!("{e:#}")))
    }
}

// ─── OpenAI Responses API ────────────────────────────────

#[derive(Serialize)]
struct OpenAiResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiResponsesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
    #[serde(default)]
    output: Vec<OpenAiOutputItem>,
}

#[derive(Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiOutputItem {
    #[serde(default)]
    content: Vec<OpenAiContentPart>,
}

#[derive(Deserialize)]
struct OpenAiContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl OpenAiResponsesResponse {
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    instructions: &str,
    input: &str,
) -> Result<String> {
    let url = format!("{}/v1/responses", config.base_url.trim_end_matches('/'));
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiResponsesRequest {
        model: &config.chat_model,
        instructions,
        input,
        max_output_tokens: config.max_output_tokens,
        temperature: 0.2,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI responses API for spelling correction")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI responses API returned {status}: {body}");
    }

    let body: OpenAiResponsesResponse = resp
        .json()
        .await
        .context("Failed to parse OpenAI responses payload")?;

    if body.status.as_deref() == Some("incomplete") {
        let reason = body
            .incomplete_details
            .and_then(|d| d.reason)
            .unwrap_or_else(|| "unknown".to_string());
        anyhow::bail!("OpenAI response incomplete: {reason}");
    }

    Ok(body.output_text())
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    instructions: &str,
    input: &str,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url.trim_end_matches('/'));

    let req = OllamaChatRequest {
        model: &config.chat_model,
        messages: vec![
            OllamaMessage {
                role: "system",
                content: instructions,
            },
            OllamaMessage {
                role: "user",
                content: input,
            },
        ],
        stream: false,
        options: OllamaOptions {
            num_predict: config.max_output_tokens,
            temperature: 0.2,
        },
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API for spelling correction")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp
        .json()
        .await
        .context("Failed to parse Ollama chat response")?;

    // Hitting num_predict means the list was cut off mid-way.
    if body.done_reason.as_deref() == Some("length") {
        anyhow::bail!("Ollama response incomplete: output token limit reached");
    }

    Ok(body.message.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_provider_builds_no_client() {
        let config = LlmConfig::default();
        assert!(HttpLlmClient::from_config(reqwest::Client::new(), config).is_none());
    }

    #[test]
    fn test_openai_output_text_joins_message_parts() {
        let body = r#"{
            "status": "completed",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "iphone 15\niphone 15 pro"},
                    {"type": "output_text", "text": "iphone case"}
                ]}
            ]
        }"#;
        let parsed: OpenAiResponsesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.output_text(), "iphone 15\niphone 15 pro\niphone case");
    }

    #[test]
    fn test_openai_incomplete_status_parses() {
        let body = r#"{"status": "incomplete", "incomplete_details": {"reason": "max_output_tokens"}, "output": []}"#;
        let parsed: OpenAiResponsesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status.as_deref(), Some("incomplete"));
        assert_eq!(
            parsed.incomplete_details.and_then(|d| d.reason).as_deref(),
            Some("max_output_tokens")
        );
    }

    #[tokio::test]
    async fn test_ollama_unparseable_body_names_the_provider() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let config = LlmConfig {
            provider: "ollama".to_string(),
            base_url: server.uri(),
            ..LlmConfig::default()
        };
        let client = HttpLlmClient::from_config(reqwest::Client::new(), config).unwrap();

        let err = client.complete("fix spelling", "ipone").await.unwrap_err();
        match err {
            Error::SuggestionUnavailable(msg) => {
                assert!(msg.contains("Failed to parse Ollama chat response"), "{msg}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
