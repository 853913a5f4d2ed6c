//! Gemini REST implementation of [`FishIdentifier`].
//!
//! Calls `models/{model}:generateContent` directly with `reqwest`: one
//! user turn holding the photo as inline data plus the fixed
//! instructions, and a generation config that pins the answer to JSON
//! matching [`super::prompt::response_schema`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::prompt::{IDENTIFICATION_INSTRUCTIONS, response_schema};
use super::{FishIdentifier, IdentifyError, parse_identification};
use crate::domain::{FishIdentification, ImageUpload};

/// Default model used for identification.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl GeminiClient {
    /// Creates a client for `model` authenticated with `api_key`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: None,
        }
    }

    /// Overrides the API base URL (no trailing slash needed).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Model name requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(image: &ImageUpload) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: image.mime_type().to_string(),
                            data: image.base64_data().to_string(),
                        },
                    },
                    Part::Text {
                        text: IDENTIFICATION_INSTRUCTIONS.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, IdentifyError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                IdentifyError::Timeout
            } else {
                IdentifyError::MalformedResponse(format!("invalid Gemini envelope: {err}"))
            }
        })?;

        extract_text_response(parsed)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FishIdentifier for GeminiClient {
    async fn identify(&self, image: &ImageUpload) -> Result<FishIdentification, IdentifyError> {
        let request = Self::build_request(image);
        let text = self.send_request(&request).await?;
        parse_identification(&text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, IdentifyError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            let detail = block_reason.map_or_else(
                || "Gemini returned no text in the response candidates".to_string(),
                |reason| format!("Gemini blocked the prompt: {reason}"),
            );
            IdentifyError::MalformedResponse(detail)
        })
}

fn map_transport_error(err: reqwest::Error) -> IdentifyError {
    if err.is_timeout() {
        IdentifyError::Timeout
    } else {
        IdentifyError::Transport(format!("Gemini request failed: {err}"))
    }
}

fn map_http_error(status: StatusCode, body: &str) -> IdentifyError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    IdentifyError::Transport(format!("HTTP {}: {message}", status.as_u16()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    const MODEL: &str = "gemini-test";
    const KEY: &str = "test-key";

    type Captured = Arc<Mutex<Option<Value>>>;

    fn candidate_text(text: &str) -> Value {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] } }
            ]
        })
    }

    async fn serve(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route(
                "/models/gemini-test:generateContent",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(KEY)
                        {
                            return (
                                StatusCode::FORBIDDEN,
                                Json(json!({"error": {"status": "PERMISSION_DENIED", "message": "bad key"}})),
                            )
                                .into_response();
                        }
                        if let Ok(mut slot) = captured.lock() {
                            *slot = Some(body);
                        }
                        (status, Json(reply)).into_response()
                    },
                ),
            )
            .with_state(Arc::clone(&captured));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), captured)
    }

    fn photo() -> ImageUpload {
        let Ok(image) = ImageUpload::new("/9j/4A==", "image/jpeg") else {
            panic!("valid jpeg");
        };
        image
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new(KEY, MODEL)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn sends_image_instructions_and_schema() {
        let bass = json!({
            "species": "Largemouth Bass",
            "description": "...",
            "habitat": "freshwater lakes",
            "isEdible": true,
            "estimatedSize": "Approx. 30-35 cm",
            "estimatedWeight": "Approx. 1.0-1.2 kg",
            "error": null
        })
        .to_string();
        let (url, captured) = serve(StatusCode::OK, candidate_text(&bass)).await;

        let Ok(fish) = client(&url).identify(&photo()).await else {
            panic!("identification failed");
        };
        assert_eq!(fish.species, "Largemouth Bass");
        assert!(fish.is_edible);

        let body = captured.lock().ok().and_then(|slot| slot.clone());
        let Some(body) = body else {
            panic!("request not captured");
        };
        let parts = body
            .pointer("/contents/0/parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            body.pointer("/contents/0/parts/0/inlineData/mimeType"),
            Some(&json!("image/jpeg"))
        );
        assert_eq!(
            body.pointer("/contents/0/parts/0/inlineData/data"),
            Some(&json!("/9j/4A=="))
        );
        assert_eq!(
            body.pointer("/contents/0/parts/1/text"),
            Some(&json!(IDENTIFICATION_INSTRUCTIONS))
        );
        assert_eq!(
            body.pointer("/generationConfig/responseMimeType"),
            Some(&json!("application/json"))
        );
        assert!(
            body.pointer("/generationConfig/responseSchema/properties/estimatedWeight")
                .is_some()
        );
    }

    #[tokio::test]
    async fn declared_error_is_domain_failure() {
        let reply = candidate_text(r#"{"error": "No fish detected in image."}"#);
        let (url, _) = serve(StatusCode::OK, reply).await;

        let result = client(&url).identify(&photo()).await;
        assert_eq!(
            result,
            Err(IdentifyError::Unidentified(
                "No fish detected in image.".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn non_json_text_is_malformed() {
        let (url, _) = serve(StatusCode::OK, candidate_text("I think it's a trout")).await;
        let result = client(&url).identify(&photo()).await;
        assert!(matches!(result, Err(IdentifyError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn blocked_prompt_is_malformed() {
        let reply = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let (url, _) = serve(StatusCode::OK, reply).await;

        let Err(IdentifyError::MalformedResponse(detail)) =
            client(&url).identify(&photo()).await
        else {
            panic!("expected malformed response");
        };
        assert!(detail.contains("SAFETY"));
    }

    #[tokio::test]
    async fn quota_error_is_transport_failure() {
        let reply = json!({
            "error": { "code": 429, "status": "RESOURCE_EXHAUSTED", "message": "Quota exceeded" }
        });
        let (url, _) = serve(StatusCode::TOO_MANY_REQUESTS, reply).await;

        let Err(IdentifyError::Transport(detail)) = client(&url).identify(&photo()).await else {
            panic!("expected transport failure");
        };
        assert!(detail.contains("429"));
        assert!(detail.contains("RESOURCE_EXHAUSTED"));
    }

    #[tokio::test]
    async fn wrong_key_is_transport_failure() {
        let (url, _) = serve(StatusCode::OK, json!({})).await;
        let client = GeminiClient::new("wrong", MODEL).with_base_url(&url);

        let result = client.identify(&photo()).await;
        assert!(matches!(result, Err(IdentifyError::Transport(_))));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_failure() {
        let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        drop(listener);

        let result = client(&format!("http://{addr}")).identify(&photo()).await;
        assert!(matches!(
            result,
            Err(IdentifyError::Transport(_) | IdentifyError::Timeout)
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let debug = format!("{:?}", GeminiClient::new("super-secret", MODEL));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains(MODEL));
    }
}
