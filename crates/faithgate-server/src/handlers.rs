//! API route handlers.

use axum::extract::State;
use axum::Json;
use tracing::{debug, info};

use faithgate_core::moderation::ModerationResult;
use faithgate_core::{Submission, Verdict};

use crate::error::{ApiError, Result};
use crate::models::{
    HealthResponse, ModerateResponse, StatsResponse, SubmissionResponse, TextRequest,
};
use crate::state::AppState;

fn check_len(state: &AppState, text: &str) -> Result<()> {
    if text.len() > state.max_text_bytes {
        return Err(ApiError::TextTooLong {
            len: text.len(),
            max: state.max_text_bytes,
        });
    }
    Ok(())
}

/// POST /api/validate-content - Moderate text and return the bare result.
pub async fn validate_content(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ModerationResult>> {
    check_len(&state, &req.text)?;
    debug!(text_len = req.text.len(), "Validating content");

    Ok(Json(state.gate.validate_content(&req.text).await))
}

/// POST /api/moderate - Moderate text and include the review flag.
pub async fn moderate(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ModerateResponse>> {
    check_len(&state, &req.text)?;
    debug!(text_len = req.text.len(), "Moderating content");

    let result = state.gate.validate_content(&req.text).await;
    let requires_review = result.requires_review();

    Ok(Json(ModerateResponse {
        allowed: result.allowed,
        reason: result.reason,
        confidence: result.confidence,
        requires_review,
    }))
}

/// POST /api/submissions/check - Screen a post, comment, prayer request, or caption.
pub async fn check_submission(
    State(state): State<AppState>,
    Json(submission): Json<Submission>,
) -> Result<Json<SubmissionResponse>> {
    check_len(&state, &submission.screening_text())?;
    debug!(kind = ?submission.kind, "Checking submission");

    let screening = state.gate.screen(&submission).await;
    let confidence = screening.result.map(|r| r.confidence).unwrap_or_default();

    info!(
        kind = ?submission.kind,
        verdict = screening.verdict.name(),
        confidence,
        "Submission check complete"
    );

    match screening.verdict {
        Verdict::Reject(rejection) => Err(ApiError::Rejected(rejection)),
        verdict => Ok(Json(SubmissionResponse {
            ok: true,
            verdict: verdict.name().to_string(),
            confidence,
        })),
    }
}

/// GET /api/stats - Get decision counters.
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let gate = state.gate.stats();

    Json(StatsResponse {
        total_decisions: gate.ai_decisions + gate.rule_decisions,
        gate,
    })
}

/// GET /api/health - Liveness check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        ai_enabled: state.gate.has_ai(),
    })
}
