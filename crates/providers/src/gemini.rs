//! Gemini provider — free-text completion via the `generateContent` API.

use async_trait::async_trait;
use chaty_core::error::GenerativeError;
use chaty_core::provider::Generative;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A Gemini REST API client.
pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerativeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| GenerativeError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl Generative for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, query: &str) -> Result<String, GenerativeError> {
        let body = ApiRequest {
            contents: vec![ApiContent {
                parts: vec![ApiPart {
                    text: query.to_string(),
                }],
            }],
        };

        debug!(model = %self.model, query_len = query.len(), "Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerativeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerativeError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| GenerativeError::Network(format!("response decode: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerativeError::EmptyCompletion("gemini".into()));
        }

        Ok(text)
    }
}

// --- API wire types ---

#[derive(Serialize)]
struct ApiRequest {
    contents: Vec<ApiContent>,
}

#[derive(Serialize, Deserialize)]
struct ApiContent {
    parts: Vec<ApiPart>,
}

#[derive(Serialize, Deserialize)]
struct ApiPart {
    text: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Deserialize)]
struct ApiCandidate {
    content: ApiContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_model() {
        let provider = GeminiProvider::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-1.5-flash",
            "test-key",
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn response_parses_candidate_text() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Hello there" } ] } }
            ]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "Hello there");
    }

    #[test]
    fn empty_candidates_parse_to_empty_vec() {
        let parsed: ApiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let provider =
            GeminiProvider::new("http://127.0.0.1:1/v1beta", "gemini-1.5-flash", "k").unwrap();
        let err = provider.complete("hello").await.unwrap_err();
        assert!(matches!(err, GenerativeError::Network(_)));
    }
}
