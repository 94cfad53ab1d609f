//! Google Gemini provider using the `generateContent` REST endpoint.
//!
//! The image travels inline as base64 next to the text prompt in a single
//! user turn. The API key is sent in the `x-goog-api-key` header so it never
//! appears in request URLs or logs.

use super::provider::{VisionProvider, VisionRequest, VisionResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gemini provider.
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

/// Join the text parts of the first candidate.
///
/// A reply without candidates means the prompt was blocked; the block
/// reason is surfaced when Gemini reports one.
fn reply_text(resp: &GenerateResponse) -> Result<String, PipelineError> {
    let candidate = resp.candidates.first().ok_or_else(|| {
        let reason = resp
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .unwrap_or("no candidates returned");
        PipelineError::llm(format!("Gemini returned no content: {reason}"))
    })?;

    let text = candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim().to_string();
    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(PipelineError::llm(format!(
            "Gemini returned empty response (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, PipelineError> {
        let start = Instant::now();

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::from_send("Gemini", e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("Gemini HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let generate_resp: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::llm(format!("Failed to parse Gemini response: {e}")))?;

        let text = reply_text(&generate_resp)?;

        Ok(VisionResponse {
            text,
            model: generate_resp
                .model_version
                .unwrap_or_else(|| self.model.clone()),
            tokens_used: generate_resp
                .usage_metadata
                .and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_url_includes_model() {
        let provider = GeminiProvider::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "k",
            "gemini-2.0-flash",
        );
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_request_serializes_inline_image() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: "prompt".to_string(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: "image/png".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 64,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 64);
    }

    #[test]
    fn test_reply_text_joins_parts() {
        let resp = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Best before "}, {"text": "12/05/2025\n"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 270, "totalTokenCount": 281},
                "modelVersion": "gemini-2.0-flash"
            }"#,
        );
        assert_eq!(reply_text(&resp).unwrap(), "Best before 12/05/2025");
        assert_eq!(resp.usage_metadata.unwrap().total_token_count, Some(281));
    }

    #[test]
    fn test_reply_text_blocked_prompt() {
        let resp = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        let err = reply_text(&resp).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_closed_port_is_retryable_connection_error() {
        use crate::llm::provider::ImageInput;
        use crate::llm::retry::is_retryable;

        let provider = GeminiProvider::new("http://127.0.0.1:1", "k", "m");
        let request = VisionRequest::new(ImageInput::from_bytes(&[1, 2, 3], "png"), "prompt");
        let err = provider.generate(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Connection(_)), "got {err}");
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_reply_text_empty_candidate() {
        let resp = parse(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);
        let err = reply_text(&resp).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
