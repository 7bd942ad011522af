/// LLM Client: the single point of entry for local text generation.
///
/// Talks to an Ollama-compatible server: `POST /api/generate` for completions
/// and `GET /api/tags` for the installed models. Responses are requested
/// unstreamed so each call yields exactly one body.
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::http_client::{ApiClient, ApiError, ApiFailure, RequestHeaders};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "mistral";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("generation failed: {0}")]
    Generation(ApiFailure),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Clone)]
pub struct LlmClient {
    api: ApiClient,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` verbatim and returns the generated text. `done` is only
    /// logged; the text is returned whatever its value.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .api
            .exchange::<_, GenerateResponse>(
                &format!("{}/api/generate", self.base_url),
                &RequestHeaders::new(),
                &request,
            )
            .await?
            .into_result()
            .map_err(LlmError::Generation)?;

        debug!(
            "Generated {} chars with model {} (done={})",
            response.response.len(),
            self.model,
            response.done
        );
        Ok(response.response)
    }

    /// Names of models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let tags = self
            .api
            .get::<TagsResponse>(&format!("{}/api/tags", self.base_url), &RequestHeaders::new())
            .await?
            .into_result()
            .map_err(LlmError::Generation)?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client(server: &MockServer) -> LlmClient {
        LlmClient::new(
            ApiClient::new(Client::new()),
            format!("{}/", server.uri()),
            DEFAULT_MODEL,
        )
    }

    #[tokio::test]
    async fn test_generate_sends_unstreamed_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(json!({
                "model": "mistral",
                "prompt": "Write a haiku",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "mistral",
                "created_at": "2024-05-01T10:00:00Z",
                "response": "Old pond, frog jumps in",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).generate("Write a haiku").await.unwrap();
        assert_eq!(text, "Old pond, frog jumps in");
    }

    #[tokio::test]
    async fn test_generate_returns_text_when_not_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "response": "Old", "done": false })),
            )
            .mount(&server)
            .await;

        let text = client(&server).generate("Write a haiku").await.unwrap();
        assert_eq!(text, "Old");
    }

    #[tokio::test]
    async fn test_generate_tolerates_missing_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "pond" })))
            .mount(&server)
            .await;

        let text = client(&server).generate("Write a haiku").await.unwrap();
        assert_eq!(text, "pond");
    }

    #[tokio::test]
    async fn test_generate_model_missing_is_generation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "error": "model 'mistral' not found" })),
            )
            .mount(&server)
            .await;

        match client(&server).generate("hi").await {
            Err(LlmError::Generation(failure)) => {
                assert_eq!(failure.status, 404);
                assert!(failure.body.contains("not found"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [
                    { "name": "mistral:latest", "size": 4109865159u64 },
                    { "name": "llama3:8b", "size": 4661224676u64 }
                ]
            })))
            .mount(&server)
            .await;

        let models = client(&server).list_models().await.unwrap();
        assert_eq!(models, vec!["mistral:latest", "llama3:8b"]);
    }
}
