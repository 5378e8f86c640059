//! Summarization collaborators that turn a student record into free text.
//!
//! The Ollama-backed client issues a single non-streaming request to the runtime's
//! `/api/generate` endpoint. The template client formats the record locally and is used when
//! no model runtime is available.

use crate::config::{Config, SummarizationProvider};
use crate::records::Student;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while attempting to summarize a student.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable or the endpoint does not exist.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by student summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Produce a human-readable summary of the student.
    async fn summarize_student(&self, student: &Student)
    -> Result<String, SummarizationClientError>;
}

/// Build a summarization client based on configuration.
pub fn get_summarization_client(
    config: &Config,
) -> Result<Box<dyn SummarizationClient>, SummarizationClientError> {
    match config.summarization_provider {
        SummarizationProvider::Template => Ok(Box::new(TemplateSummarizationClient)),
        SummarizationProvider::Ollama => Ok(Box::new(OllamaSummarizationClient::new(
            config.ollama_base_url(),
            config.summarization_model.clone(),
            config.summary_timeout(),
        )?)),
    }
}

/// Prompt sent to the model for a given student.
pub fn build_prompt(student: &Student) -> String {
    format!(
        "Generate a summary for a student with the following details: ID={}, Name={}, Age={}, Email={}",
        student.id, student.name, student.age, student.email
    )
}

/// Deterministic summarizer that formats the record without calling out.
pub struct TemplateSummarizationClient;

#[async_trait]
impl SummarizationClient for TemplateSummarizationClient {
    async fn summarize_student(
        &self,
        student: &Student,
    ) -> Result<String, SummarizationClientError> {
        Ok(format!(
            "Student {}, age {}, email {}",
            student.name, student.age, student.email
        ))
    }
}

/// Summarizer backed by an Ollama runtime.
pub struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizationClient {
    /// Construct a client for the runtime at `base_url` with a per-request timeout.
    pub fn new(
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("student-registry/summary")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        tracing::debug!(url = %base_url, model = %model, "Initialized Ollama summarization client");
        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn summarize_student(
        &self,
        student: &Student,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": build_prompt(student),
            "stream": false,
            "options": {
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn student() -> Student {
        Student {
            id: 1,
            name: "Ann".into(),
            age: 20,
            email: "a@x.com".into(),
        }
    }

    fn client_for(server: &MockServer) -> OllamaSummarizationClient {
        OllamaSummarizationClient::new(
            server.base_url(),
            "llama-test".into(),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn ollama_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{"model": "llama-test", "stream": false}"#);
                then.status(200).json_body(json!({
                    "response": "  Ann is a 20 year old student.\n",
                    "done": true
                }));
            })
            .await;

        let summary = client.summarize_student(&student()).await.expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "Ann is a 20 year old student.");
    }

    #[tokio::test]
    async fn ollama_client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client
            .summarize_student(&student())
            .await
            .expect_err("error response");

        assert!(
            matches!(
                error,
                SummarizationClientError::GenerationFailed(ref message) if message.contains("500")
            ),
            "unexpected error: {error}"
        );
    }

    #[tokio::test]
    async fn ollama_client_reports_missing_endpoint() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404);
            })
            .await;

        let error = client.summarize_student(&student()).await.expect_err("404");
        assert!(matches!(
            error,
            SummarizationClientError::ProviderUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn ollama_client_rejects_unexpected_shape() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({ "summary": "wrong key" }));
            })
            .await;

        let error = client.summarize_student(&student()).await.expect_err("shape");
        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn ollama_client_rejects_incomplete_response() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .json_body(json!({ "response": "partial", "done": false }));
            })
            .await;

        let error = client.summarize_student(&student()).await.expect_err("partial");
        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn template_client_formats_record() {
        let summary = TemplateSummarizationClient
            .summarize_student(&student())
            .await
            .expect("template");
        assert_eq!(summary, "Student Ann, age 20, email a@x.com");
    }

    #[test]
    fn prompt_mentions_every_field() {
        let prompt = build_prompt(&student());
        for needle in ["ID=1", "Name=Ann", "Age=20", "Email=a@x.com"] {
            assert!(prompt.contains(needle), "missing {needle} in {prompt}");
        }
    }
}
