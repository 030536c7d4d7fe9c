//! External AI classifier adapter.
//!
//! Posts `{"text": ...}` to a text-validation endpoint and normalizes the
//! response into a [`ModerationResult`]. Every failure is returned as a
//! [`ClassifierError`]; recovering from it is the gate's job.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::fallback::ContentClassifier;
use super::{DecisionTier, ModerationResult};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Confidence used when the backend omits one.
pub const DEFAULT_AI_CONFIDENCE: f32 = 0.7;

/// Errors from a classifier backend.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The request could not be completed.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Configuration for the AI classifier.
#[derive(Debug, Clone)]
pub struct AiClassifierConfig {
    /// URL of the text-validation endpoint.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Treat a response without `allowed` as malformed instead of allowing.
    ///
    /// Off by default, which keeps the fail-open behavior of the backend contract.
    pub treat_missing_verdict_as_error: bool,
}

impl AiClassifierConfig {
    /// Creates a config for the given endpoint with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            treat_missing_verdict_as_error: false,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Makes a missing `allowed` field trigger fallback.
    pub fn fail_closed(mut self) -> Self {
        self.treat_missing_verdict_as_error = true;
        self
    }
}

/// Request body sent to the backend.
#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    text: &'a str,
}

/// Response body from the backend. Every field is optional.
#[derive(Debug, Deserialize)]
struct ValidateResponse {
    allowed: Option<bool>,
    reason: Option<String>,
    confidence: Option<f32>,
}

/// Classifier backed by an external HTTP service.
pub struct AiClassifier {
    client: reqwest::Client,
    config: AiClassifierConfig,
}

impl AiClassifier {
    /// Creates a classifier with the given configuration.
    pub fn new(config: AiClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Sends the text to the backend and normalizes its answer.
    pub async fn validate(&self, text: &str) -> Result<ModerationResult, ClassifierError> {
        debug!(
            endpoint = %self.config.endpoint,
            text_len = text.len(),
            "Requesting AI validation"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&ValidateRequest { text })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        self.normalize(&body)
    }

    fn normalize(&self, body: &[u8]) -> Result<ModerationResult, ClassifierError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        if !value.is_object() {
            return Err(ClassifierError::Malformed(
                "response is not a JSON object".to_string(),
            ));
        }

        let parsed: ValidateResponse =
            serde_json::from_value(value).map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        if parsed.allowed.is_none() && self.config.treat_missing_verdict_as_error {
            return Err(ClassifierError::Malformed(
                "response has no verdict".to_string(),
            ));
        }

        Ok(ModerationResult {
            allowed: parsed.allowed.unwrap_or(true),
            reason: parsed.reason,
            confidence: parsed
                .confidence
                .unwrap_or(DEFAULT_AI_CONFIDENCE)
                .clamp(0.0, 1.0),
            tier: DecisionTier::Ai,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout(self.config.timeout)
        } else if e.is_decode() {
            ClassifierError::Malformed(e.to_string())
        } else {
            ClassifierError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ContentClassifier for AiClassifier {
    async fn classify(&self, text: &str) -> Result<ModerationResult, ClassifierError> {
        self.validate(text).await
    }

    fn tier(&self) -> DecisionTier {
        DecisionTier::Ai
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/validate-content", addr)
    }

    pub(crate) fn json_backend(body: Value) -> Router {
        Router::new().route(
            "/api/validate-content",
            post(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        )
    }

    pub(crate) fn status_backend(status: StatusCode) -> Router {
        Router::new().route("/api/validate-content", post(move || async move { status }))
    }

    pub(crate) fn raw_backend(body: &'static str) -> Router {
        Router::new().route("/api/validate-content", post(move || async move { body }))
    }

    async fn classifier_for(router: Router) -> AiClassifier {
        let endpoint = spawn_backend(router).await;
        AiClassifier::new(AiClassifierConfig::new(endpoint)).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = AiClassifierConfig::new("http://localhost/api/validate-content");
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert!(!config.treat_missing_verdict_as_error);
        assert!(config.fail_closed().treat_missing_verdict_as_error);
    }

    #[tokio::test]
    async fn passes_backend_verdict_through() {
        let classifier = classifier_for(json_backend(json!({
            "allowed": false,
            "reason": "Please keep prayers Christ-centered",
            "confidence": 0.85
        })))
        .await;

        let result = classifier.validate("some text").await.unwrap();
        assert!(!result.allowed);
        assert_eq!(
            result.reason.as_deref(),
            Some("Please keep prayers Christ-centered")
        );
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.tier, DecisionTier::Ai);
    }

    #[tokio::test]
    async fn empty_object_uses_defaults() {
        let classifier = classifier_for(json_backend(json!({}))).await;

        let result = classifier.validate("anything").await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.confidence, DEFAULT_AI_CONFIDENCE);
        assert!(result.reason.is_none());
    }

    #[tokio::test]
    async fn null_fields_use_defaults() {
        let classifier = classifier_for(json_backend(
            json!({"allowed": null, "confidence": null, "reason": null}),
        ))
        .await;

        let result = classifier.validate("anything").await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.confidence, 0.7);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let classifier = classifier_for(json_backend(json!({"confidence": 3.0}))).await;
        let result = classifier.validate("anything").await.unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn missing_verdict_fails_when_closed() {
        let endpoint = spawn_backend(json_backend(json!({"confidence": 0.9}))).await;
        let classifier = AiClassifier::new(AiClassifierConfig::new(endpoint).fail_closed()).unwrap();

        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let classifier = classifier_for(status_backend(StatusCode::INTERNAL_SERVER_ERROR)).await;
        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Status(500)));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let classifier = classifier_for(raw_backend("<html>oops</html>")).await;
        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn non_object_json_is_malformed() {
        let classifier = classifier_for(json_backend(json!([true, "ok"]))).await;
        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn wrong_field_type_is_malformed() {
        let classifier = classifier_for(json_backend(json!({"allowed": "yes"}))).await;
        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Bind then drop a listener so the port is closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let classifier = AiClassifier::new(AiClassifierConfig::new(format!(
            "http://{}/api/validate-content",
            addr
        )))
        .unwrap();

        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Network(_)));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let router = Router::new().route(
            "/api/validate-content",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"allowed": true}))
            }),
        );
        let endpoint = spawn_backend(router).await;
        let classifier = AiClassifier::new(
            AiClassifierConfig::new(endpoint).with_timeout(Duration::from_millis(100)),
        )
        .unwrap();

        let err = classifier.validate("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Timeout(_)));
    }

    #[tokio::test]
    async fn sends_text_as_json_payload() {
        let router = Router::new().route(
            "/api/validate-content",
            post(|Json(body): Json<Value>| async move {
                let echoed = body["text"].as_str().unwrap_or_default().to_string();
                Json(json!({"allowed": true, "reason": echoed}))
            }),
        );
        let classifier = classifier_for(router).await;

        let result = classifier.validate("Jesus is Lord").await.unwrap();
        assert_eq!(result.reason.as_deref(), Some("Jesus is Lord"));
    }
}
