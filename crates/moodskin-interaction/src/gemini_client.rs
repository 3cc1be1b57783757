//! Generative prompt classifier over the Gemini REST API.
//!
//! The model is asked for exactly one mood word; the reply goes through the
//! regular label normalization.

use async_trait::async_trait;
use moodskin_core::CanonicalMood;
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::inference::{TextInference, TextMoodInference};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::http::{self, Service};

const NAME: &str = "Gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// "joy, sadness, ..., disgust"
fn mood_words() -> String {
    CanonicalMood::iter()
        .map(|mood| mood.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct GeminiTextClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiTextClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: http::build_client(),
            api_key,
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the API base (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Classify the dominant emotion of the following text. \
         Reply with exactly one word from this list and nothing else: {}.\n\nText: {}",
        mood_words(),
        text
    )
}

fn build_request(text: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: build_prompt(text),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.0,
            max_output_tokens: 8,
        },
    }
}

/// The first candidate's text, or `neutral` when the model replied with nothing.
fn extract_label(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| {
            tracing::debug!("{} returned no text; using {}", NAME, CanonicalMood::Neutral);
            CanonicalMood::Neutral.to_string()
        })
}

#[async_trait]
impl TextMoodInference for GeminiTextClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, text: &str) -> Result<TextInference> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MoodskinError::inference(format!(
                "{NAME} API key is not configured (secret.json or GEMINI_API_KEY)"
            ))
        })?;

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&build_request(text))
            .send()
            .await
            .map_err(|e| http::request_error(Service::Inference, NAME, e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(Service::Inference, NAME, response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| http::request_error(Service::Inference, NAME, e))?;

        let label = extract_label(parsed);
        tracing::debug!(label = %label.trim(), "{} labeled text", NAME);
        Ok(TextInference::Label(label))
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
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_mood() {
        let prompt = build_prompt("I won the lottery");
        for word in ["joy", "sadness", "anger", "fear", "surprise", "love", "neutral", "disgust"] {
            assert!(prompt.contains(word), "{word}");
        }
        assert!(prompt.ends_with("Text: I won the lottery"));
    }

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(build_request("hi")).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8);
        assert!(json["contents"][0]["parts"][0]["text"].is_string());
    }

    #[test]
    fn test_extract_label() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Joy\n"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_label(response), "Joy\n");
    }

    #[test]
    fn test_empty_reply_falls_back_to_neutral() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(extract_label(blocked), "neutral");

        let blank: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  \n"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_label(blank), "neutral");
    }

    #[test]
    fn test_mood_words_matches_canonical_set() {
        assert_eq!(mood_words().split(", ").count(), 8);
        assert!(mood_words().starts_with(CanonicalMood::Joy.as_ref()));
    }
}
