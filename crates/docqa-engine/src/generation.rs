use std::time::Duration;

use docqa_core::config::GenerationSettings;
use docqa_core::error::{Error, Result};
use docqa_core::traits::Generator;
use serde::{Deserialize, Serialize};

/// Longest slice of an error body quoted back in a generation error.
const ERROR_BODY_PREVIEW: usize = 300;

/// Client for an OpenAI-compatible `chat/completions` endpoint (OpenRouter by
/// default). Sends the composed prompt as a single user message.
pub struct ChatCompletionsClient {
    http: reqwest::blocking::Client,
    api_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Validates credentials and endpoint up front so a misconfigured
    /// deployment fails at startup rather than on the first question.
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let api_key = settings.api_key.as_deref().map(str::trim).unwrap_or_default();
        if api_key.is_empty() {
            return Err(Error::Config(
                "no generation API key; set OPENROUTER_API_KEY or APP_GENERATION__API_KEY".to_string(),
            ));
        }
        if is_placeholder_key(api_key) {
            return Err(Error::Config("generation API key is still the example placeholder".to_string()));
        }
        if settings.model.trim().is_empty() {
            return Err(Error::Config("generation.model must not be empty".to_string()));
        }
        if settings.timeout_secs == 0 {
            return Err(Error::Config("generation.timeout_secs must be at least 1".to_string()));
        }
        let url = reqwest::Url::parse(&settings.api_url)
            .map_err(|e| Error::Config(format!("generation.api_url {:?} is invalid: {e}", settings.api_url)))?;

        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        tracing::info!(url = %url, model = %settings.model, "generation client ready");
        Ok(Self {
            http,
            api_url: url.into(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    pub fn model(&self) -> &str { &self.model }

    /// One chat-completions round trip; returns the first choice's text.
    pub fn send(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest { model: &self.model, messages: [ChatMessage { role: "user", content: prompt }] };
        let started = std::time::Instant::now();

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Generation(format!("API request timed out after {}s", self.timeout.as_secs()))
                } else {
                    Error::Generation(format!("API connection failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(Error::Generation(format!("API returned {status}: {}", preview.trim())));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::Generation(format!("malformed API response: {e}")))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Generation("API response contained no message content".to_string()))?;

        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, chars = text.len(), "generation complete");
        Ok(text.trim().to_string())
    }
}

impl Generator for ChatCompletionsClient {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> { Ok(self.send(prompt)?) }
}

fn is_placeholder_key(key: &str) -> bool { key.contains("...") || key.eq_ignore_ascii_case("sk-or-v1-your-key") }

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(key: Option<&str>) -> GenerationSettings {
        GenerationSettings { api_key: key.map(str::to_string), ..GenerationSettings::default() }
    }

    #[test]
    fn missing_or_blank_key_is_config_error() {
        assert!(matches!(ChatCompletionsClient::new(&settings(None)), Err(Error::Config(_))));
        assert!(matches!(ChatCompletionsClient::new(&settings(Some("   "))), Err(Error::Config(_))));
    }

    #[test]
    fn placeholder_key_is_rejected() {
        let err = ChatCompletionsClient::new(&settings(Some("sk-or-v1-..."))).err();
        assert!(matches!(err, Some(Error::Config(msg)) if msg.contains("placeholder")));
    }

    #[test]
    fn bad_url_and_zero_timeout_are_rejected() {
        let mut s = settings(Some("test-key"));
        s.api_url = "not a url".into();
        assert!(matches!(ChatCompletionsClient::new(&s), Err(Error::Config(_))));

        let mut s = settings(Some("test-key"));
        s.timeout_secs = 0;
        assert!(matches!(ChatCompletionsClient::new(&s), Err(Error::Config(_))));
    }

    #[test]
    fn valid_settings_build_a_client() {
        let client = ChatCompletionsClient::new(&settings(Some(" test-key "))).expect("client");
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.model(), GenerationSettings::default().model);
    }
}
