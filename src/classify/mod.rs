//! Classification orchestrator.
//!
//! Given a signed image URL: fetch the bytes, encode them as a base64 data
//! URI, and try the hosted model's three endpoint path variants in fixed
//! order. Each variant is attempted exactly once, stopping at the first
//! HTTP-success response; if all three fail the orchestrator degrades to the
//! deterministic mock generator instead of failing the request.

pub mod diseases;
pub mod mock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use crate::config::ClassifierConfig;
use crate::error::{ServerError, ServerResult};
use crate::models::Prediction;

/// Endpoint path variants for the hosted model, oldest Gradio convention
/// last. Fixed order, one attempt each.
const ENDPOINT_VARIANTS: [&str; 3] = ["/call/predict", "/api/predict", "/run/predict"];

/// Base64 chunk length. Must be a multiple of 3 so the concatenated chunk
/// encodings form one valid base64 stream without padding in the middle.
const ENCODE_CHUNK: usize = 8190;

pub struct Classifier {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(http: reqwest::Client, config: ClassifierConfig) -> Self {
        if config.api_token.is_none() {
            tracing::info!("No classifier API token configured; hosted model calls are anonymous");
        }
        Self { http, config }
    }

    /// Run the full analysis flow for one image.
    ///
    /// One network fetch, up to three classification calls. No caching:
    /// repeated analysis of the same image produces independent predictions,
    /// and in mock mode identical output for identical (byte length, user id)
    /// pairs.
    pub async fn analyze(&self, image_url: &str, user_id: &str) -> ServerResult<Prediction> {
        let (bytes, content_type) = self.fetch_image(image_url).await?;
        let data_uri = encode_data_uri(&bytes, &content_type);

        tracing::info!(
            image_bytes = bytes.len(),
            content_type = %content_type,
            "Attempting hosted model classification"
        );

        for variant in ENDPOINT_VARIANTS {
            let endpoint = format!("{}{variant}", self.config.base_url);
            match self.call_endpoint(&endpoint, &data_uri).await {
                Ok(prediction) => {
                    tracing::info!(endpoint = %endpoint, "Hosted model responded");
                    return Ok(prediction);
                }
                Err(err) => {
                    tracing::warn!(endpoint = %endpoint, error = %err, "Endpoint attempt failed");
                }
            }
        }

        tracing::info!("Hosted model unreachable; using deterministic mock prediction");
        Ok(mock::mock_prediction(bytes.len(), user_id))
    }

    /// Fetch the image bytes from the signed URL.
    async fn fetch_image(&self, image_url: &str) -> ServerResult<(Vec<u8>, String)> {
        let response = self
            .http
            .get(image_url)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("Failed to fetch image: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "Failed to fetch image from storage: status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServerError::Upstream(format!("Failed to read image body: {e}")))?;

        Ok((bytes.to_vec(), content_type))
    }

    /// One attempt against one endpoint variant. Non-success status is an
    /// error so the caller advances to the next variant.
    async fn call_endpoint(&self, endpoint: &str, data_uri: &str) -> ServerResult<Prediction> {
        let response = self
            .http
            .post(endpoint)
            .json(&json!({ "data": [data_uri] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::Upstream(format!(
                "status {status}: {body}"
            )));
        }

        let result: serde_json::Value = response.json().await?;
        parse_model_response(result)
    }
}

/// Encode image bytes as a base64 data URI in bounded-size chunks rather
/// than one pass over the whole buffer.
pub fn encode_data_uri(bytes: &[u8], content_type: &str) -> String {
    let mut encoded = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(ENCODE_CHUNK) {
        BASE64.encode_string(chunk, &mut encoded);
    }
    format!("data:{content_type};base64,{encoded}")
}

/// Pull the prediction out of the model response. Gradio wraps the payload
/// as `{"data": [prediction]}`; some deployments return it bare.
fn parse_model_response(result: serde_json::Value) -> ServerResult<Prediction> {
    let payload = result
        .get("data")
        .and_then(|d| d.get(0))
        .cloned()
        .unwrap_or(result);

    let prediction: Prediction = serde_json::from_value(payload)
        .map_err(|e| ServerError::Upstream(format!("Unparseable model response: {e}")))?;

    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_encoding_matches_single_pass() {
        // Longer than one chunk so the chunk boundary is exercised.
        let bytes: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let uri = encode_data_uri(&bytes, "image/png");
        let expected = format!("data:image/png;base64,{}", BASE64.encode(&bytes));
        assert_eq!(uri, expected);
    }

    #[test]
    fn chunk_length_is_multiple_of_three() {
        assert_eq!(ENCODE_CHUNK % 3, 0);
    }

    #[test]
    fn endpoint_variants_in_fixed_order() {
        assert_eq!(
            ENDPOINT_VARIANTS,
            ["/call/predict", "/api/predict", "/run/predict"]
        );
    }

    #[test]
    fn parses_wrapped_model_response() {
        let value = serde_json::json!({
            "data": [{
                "disease_code": "mel",
                "disease_name": "Melanoma",
                "confidence": 0.91,
                "all_probabilities": { "mel": 0.91, "nv": 0.05 }
            }]
        });
        let p = parse_model_response(value).unwrap();
        assert_eq!(p.disease_code, "mel");
        assert_eq!(p.confidence, 0.91);
        assert!(!p.mocked);
    }

    #[test]
    fn parses_bare_model_response() {
        let value = serde_json::json!({
            "disease_code": "nv",
            "confidence": 0.8
        });
        let p = parse_model_response(value).unwrap();
        assert_eq!(p.disease_code, "nv");
        assert!(p.all_probabilities.is_empty());
    }

    #[test]
    fn rejects_garbage_model_response() {
        let value = serde_json::json!({ "data": ["not a prediction"] });
        assert!(parse_model_response(value).is_err());
    }
}
