//! Hosted emotion classifier (Hugging Face inference API).
//!
//! `POST {model_url}` with `{"inputs": text}` and a bearer key; the response is
//! `[[{"label", "score"}, ...]]`, one inner list per input.

use async_trait::async_trait;
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::inference::{LabelScore, TextInference, TextMoodInference};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{self, Service};

const NAME: &str = "Hugging Face";

#[derive(Clone)]
pub struct HuggingFaceTextClient {
    client: Client,
    model_url: String,
    api_key: Option<String>,
}

impl HuggingFaceTextClient {
    pub fn new(model_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: http::build_client(),
            model_url: model_url.into(),
            api_key,
        }
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

fn parse_scores(body: &str) -> Result<Vec<LabelScore>> {
    let parsed: ClassifyResponse = serde_json::from_str(body)
        .map_err(|e| MoodskinError::inference(format!("{NAME} response not understood: {e}")))?;

    let scores = match parsed {
        ClassifyResponse::Batched(mut batches) => {
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.swap_remove(0)
            }
        }
        ClassifyResponse::Flat(scores) => scores,
    };
    Ok(scores)
}

#[async_trait]
impl TextMoodInference for HuggingFaceTextClient {
    fn provider(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<TextInference> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MoodskinError::inference(format!(
                "{NAME} API key is not configured (secret.json or HF_API_KEY)"
            ))
        })?;

        let response = self
            .client
            .post(&self.model_url)
            .bearer_auth(api_key)
            .json(&ClassifyRequest { inputs: text })
            .send()
            .await
            .map_err(|e| http::request_error(Service::Inference, NAME, e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(Service::Inference, NAME, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| http::request_error(Service::Inference, NAME, e))?;
        let scores = parse_scores(&body)?;
        tracing::debug!(candidates = scores.len(), "{} classified text", NAME);
        Ok(TextInference::Scores(scores))
    }
}
