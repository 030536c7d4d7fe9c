//! API request and response models.

use faithgate_core::moderation::GateStats;
use serde::{Deserialize, Serialize};

/// Request body for POST /api/validate-content and POST /api/moderate.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    /// The text to moderate.
    #[serde(default)]
    pub text: String,
}

/// Response body for POST /api/moderate.
#[derive(Debug, Serialize)]
pub struct ModerateResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub confidence: f32,
    /// Whether allowed content should be queued for human review.
    pub requires_review: bool,
}

/// Response body for POST /api/submissions/check when the submission is allowed.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub ok: bool,
    /// "publish" or "review".
    pub verdict: String,
    pub confidence: f32,
}

/// Response body for GET /api/stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_decisions: u64,
    #[serde(flatten)]
    pub gate: GateStats,
}

/// Response body for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub ai_enabled: bool,
}
