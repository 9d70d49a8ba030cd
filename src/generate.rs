/*
This module is the seam between the pipeline and the language model. The
pipeline only ever sees the `Generator` trait; the one backend shipped here
talks to an OpenAI-compatible completions endpoint over blocking HTTP. The
request carries a hard timeout so a hung backend fails the call instead of
stalling the run.
*/
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A black-box text generator: one prompt in, the generated continuation
/// out. Calls are synchronous and may fail.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion endpoint answered {status}: {body}")]
    Api { status: u16, body: String },
    #[error("completion response contained no choices")]
    EmptyResponse,
}

/// Connection and sampling parameters of the HTTP completion backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Base URL of an OpenAI-compatible server, without the `/v1` suffix.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Whole-request timeout; on expiry the generation call returns an error.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        CompletionOptions {
            base_url: String::from("http://localhost:8000"),
            model: String::from("meta-llama/Llama-2-7b-chat-hf"),
            max_tokens: 1024,
            temperature: 0.6,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Blocking client for the `/v1/completions` endpoint of an
/// OpenAI-compatible inference server.
pub struct CompletionClient {
    http: reqwest::blocking::Client,
    options: CompletionOptions,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl CompletionClient {
    pub fn new(options: CompletionOptions) -> Result<Self, GenerateError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .build()?;
        Ok(CompletionClient { http, options })
    }
}

impl Generator for CompletionClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/v1/completions",
            self.options.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .json(&CompletionRequest {
                model: &self.options.model,
                prompt,
                max_tokens: self.options.max_tokens,
                temperature: self.options.temperature,
            })
            .send()?;
        if !response.status().is_success() {
            return Err(GenerateError::Api {
                status: response.status().as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        let completion: CompletionResponse = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or(GenerateError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = CompletionRequest {
            model: "m",
            prompt: "p",
            max_tokens: 16,
            temperature: 0.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["prompt"], "p");
        assert_eq!(value["max_tokens"], 16);
    }

    #[test]
    fn test_response_wire_shape() {
        let parsed: CompletionResponse =
            serde_json::from_str(r#"{"id":"x","choices":[{"text":" O O #####","index":0}]}"#)
                .unwrap();
        assert_eq!(parsed.choices[0].text, " O O #####");
    }
}
