//! Facial-expression classifier behind a REST endpoint.
//!
//! Request: `{"image": "<base64>", "mimeType": "image/jpeg"}`.
//! Response: `{"expressions": {"happy": 0.9, ...}}`, or `{"expressions": null}`
//! when no face was found.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use moodskin_core::camera::Frame;
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::inference::{FacialMoodInference, FacialSample, LabelScore};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{self, Service};

const NAME: &str = "facial classifier";

#[derive(Clone)]
pub struct RestFacialClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl RestFacialClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: http::build_client(),
            endpoint,
            api_key,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    image: String,
    mime_type: String,
}

impl AnalyzeRequest {
    fn from_frame(frame: &Frame) -> Self {
        Self {
            image: BASE64_STANDARD.encode(&frame.bytes),
            mime_type: frame.mime_type.clone(),
        }
    }
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    expressions: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Keeps the provider's key order; non-numeric probabilities are skipped.
fn to_sample(response: AnalyzeResponse) -> FacialSample {
    let Some(expressions) = response.expressions else {
        return FacialSample::NoFace;
    };

    let scores: Vec<LabelScore> = expressions
        .into_iter()
        .filter_map(|(name, value)| value.as_f64().map(|score| LabelScore::new(name, score)))
        .collect();

    if scores.is_empty() {
        FacialSample::NoFace
    } else {
        FacialSample::Expressions(scores)
    }
}

#[async_trait]
impl FacialMoodInference for RestFacialClient {
    fn provider(&self) -> &str {
        "rest-facial"
    }

    async fn analyze(&self, frame: &Frame) -> Result<FacialSample> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            MoodskinError::inference("no facial classifier endpoint configured ([inference] facial_endpoint)")
        })?;

        let mut request = self
            .client
            .post(endpoint)
            .json(&AnalyzeRequest::from_frame(frame));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::request_error(Service::Inference, NAME, e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(Service::Inference, NAME, response).await);
        }

        let parsed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| http::request_error(Service::Inference, NAME, e))?;
        Ok(to_sample(parsed))
    }
}
