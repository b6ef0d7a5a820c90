//! AI description polish via the Gemini text generation API.
//!
//! Enhancement is best-effort: every method returns a usable value. When the
//! credential is missing or the service misbehaves the original places come
//! back untouched, with a status saying why.

use std::time::Duration;

use asir_core::config::AiConfig;
use asir_core::error::{EnhancementError, ReqwestErrorExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::model::Place;
use crate::retry::{send_with_retry, RetryConfig};

/// Summary shown when no credential is configured.
pub const SUMMARY_UNAVAILABLE: &str = "Detailed tourism information coming soon.";
/// Summary shown when the service call fails.
pub const SUMMARY_FALLBACK: &str = "Explore the beauty of Asir.";

#[derive(Debug, Clone, PartialEq)]
pub enum EnhancementStatus {
    Enhanced,
    MissingCredential,
    Failed(EnhancementError),
}

/// Places after an enhancement attempt, always safe to stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub places: Vec<Place>,
    pub status: EnhancementStatus,
}

impl Enhancement {
    fn unchanged(places: &[Place], status: EnhancementStatus) -> Self {
        Self {
            places: places.to_vec(),
            status,
        }
    }

    pub fn is_enhanced(&self) -> bool {
        self.status == EnhancementStatus::Enhanced
    }

    /// Why the places were left unchanged, if they were.
    pub fn error(&self) -> Option<EnhancementError> {
        match &self.status {
            EnhancementStatus::Enhanced => None,
            EnhancementStatus::MissingCredential => Some(EnhancementError::MissingCredential),
            EnhancementStatus::Failed(e) => Some(e.clone()),
        }
    }
}

/// Writes descriptions for places and regions.
#[async_trait]
pub trait DescriptionEnhancer: Send + Sync {
    /// Replace each place's description positionally. Never fails; see
    /// `Enhancement::status`.
    async fn enhance(&self, places: &[Place], region: &str) -> Enhancement;

    /// A short introduction to a region for visitors.
    async fn summarize(&self, region: &str) -> String;
}

/// Enhancer used when AI polish is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnhancer;

#[async_trait]
impl DescriptionEnhancer for NoopEnhancer {
    async fn enhance(&self, places: &[Place], _region: &str) -> Enhancement {
        Enhancement::unchanged(places, EnhancementStatus::MissingCredential)
    }

    async fn summarize(&self, _region: &str) -> String {
        SUMMARY_UNAVAILABLE.to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        Some(text)
    }
}

fn enhancement_prompt(places: &[Place], region: &str) -> String {
    let listing = places
        .iter()
        .map(|p| format!("{} ({})", p.name, p.category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a travel expert for the Asir region in Saudi Arabia.\n\
         Below is a list of places in {region}.\n\
         Write one short, inviting sentence in English describing each place, based on its name and type.\n\
         Respond with a JSON array of strings in exactly the same order as the list.\n\n\
         Places:\n{listing}"
    )
}

fn summary_prompt(region: &str) -> String {
    format!(
        "Write a brief, captivating two-sentence introduction for tourists visiting {region}, Asir, Saudi Arabia."
    )
}

/// Parse the model output into exactly `expected` descriptions.
fn parse_descriptions(text: &str, expected: usize) -> Result<Vec<String>, EnhancementError> {
    let descriptions: Vec<String> = serde_json::from_str(text.trim()).map_err(|e| {
        EnhancementError::InvalidResponse(format!("not a JSON string array: {}", e))
    })?;

    if descriptions.len() != expected {
        return Err(EnhancementError::LengthMismatch {
            expected,
            actual: descriptions.len(),
        });
    }
    Ok(descriptions)
}

/// Gemini-backed enhancer.
pub struct GeminiEnhancer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    retry: RetryConfig,
}

impl GeminiEnhancer {
    pub fn new(config: &AiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            tracing::warn!("Gemini API key is missing; AI polish will return places unchanged");
        }

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig {
                max_retries: config.max_retries,
                ..RetryConfig::default()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// One generateContent round trip returning the candidate text.
    async fn generate(
        &self,
        api_key: &str,
        prompt: String,
        json: bool,
    ) -> Result<String, EnhancementError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: json.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };
        let url = self.endpoint();

        let response = send_with_retry(&self.retry, || {
            self.client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
        })
        .await
        .map_err(|e| EnhancementError::Request(e.into_network_error().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EnhancementError::Request(format!("HTTP {}: {}", status, detail)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EnhancementError::InvalidResponse(e.to_string()))?;

        parsed.text().ok_or_else(|| {
            EnhancementError::InvalidResponse("no candidates in response".to_string())
        })
    }
}

impl std::fmt::Debug for GeminiEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEnhancer")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_credential", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl DescriptionEnhancer for GeminiEnhancer {
    #[instrument(skip(self, places), fields(count = places.len()), level = "info")]
    async fn enhance(&self, places: &[Place], region: &str) -> Enhancement {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Gemini API key is missing. Returning original places.");
            return Enhancement::unchanged(places, EnhancementStatus::MissingCredential);
        };

        let outcome = self
            .generate(api_key, enhancement_prompt(places, region), true)
            .await
            .and_then(|text| parse_descriptions(&text, places.len()));

        match outcome {
            Ok(descriptions) => {
                let enhanced = places
                    .iter()
                    .zip(descriptions)
                    .map(|(place, description)| place.with_description(description))
                    .collect();
                tracing::info!("Enhanced {} descriptions", places.len());
                Enhancement {
                    places: enhanced,
                    status: EnhancementStatus::Enhanced,
                }
            }
            Err(e) => {
                tracing::error!("Error enhancing content with Gemini: {}", e);
                Enhancement::unchanged(places, EnhancementStatus::Failed(e))
            }
        }
    }

    #[instrument(skip(self), level = "info")]
    async fn summarize(&self, region: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return SUMMARY_UNAVAILABLE.to_string();
        };

        match self.generate(api_key, summary_prompt(region), false).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => SUMMARY_FALLBACK.to_string(),
            Err(e) => {
                tracing::warn!("Region summary failed: {}", e);
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_descriptions() {
        let parsed = parse_descriptions(r#" ["a", "b"] "#, 2).unwrap();
        assert_eq!(parsed, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_descriptions_length_mismatch() {
        let err = parse_descriptions(r#"["a"]"#, 2).unwrap_err();
        assert_eq!(
            err,
            EnhancementError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_parse_descriptions_rejects_non_strings() {
        let err = parse_descriptions(r#"[1, 2]"#, 2).unwrap_err();
        assert!(matches!(err, EnhancementError::InvalidResponse(_)));
        let err = parse_descriptions(r#"{"a": "b"}"#, 1).unwrap_err();
        assert!(matches!(err, EnhancementError::InvalidResponse(_)));
    }

    #[test]
    fn test_prompt_lists_every_place_in_order() {
        let places = crate::seed::seed_governorates().remove(0).places;
        let prompt = enhancement_prompt(&places, "Abha");
        let first = prompt.find("High City (Al Madinah Al Aliya) (Tourist Sites)").unwrap();
        let second = prompt.find("Blue Inn Hotel (Hotels & Accommodation)").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Abha"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[tokio::test]
    async fn test_noop_enhancer_returns_input() {
        let places = crate::seed::seed_governorates().remove(0).places;
        let result = NoopEnhancer.enhance(&places, "Abha").await;
        assert_eq!(result.places, places);
        assert_eq!(result.error(), Some(EnhancementError::MissingCredential));
        assert_eq!(NoopEnhancer.summarize("Abha").await, SUMMARY_UNAVAILABLE);
    }
}
