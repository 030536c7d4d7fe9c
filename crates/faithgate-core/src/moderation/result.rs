//! Moderation decisions.

use serde::{Deserialize, Serialize};

/// Allowed content below this confidence is flagged for human review.
pub const REVIEW_THRESHOLD: f32 = 0.6;

/// Which classifier produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionTier {
    /// Deterministic term rules.
    #[default]
    Rules,
    /// External AI classifier.
    Ai,
}

impl DecisionTier {
    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            DecisionTier::Rules => "rules",
            DecisionTier::Ai => "ai",
        }
    }
}

/// Result of moderating a piece of text.
///
/// Serializes as `{allowed, reason?, confidence}`. The producing tier is kept
/// for observability only and is not part of the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Final decision.
    pub allowed: bool,
    /// Human-readable reason, present on rejection or when supplied by the AI backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Confidence attached to the decision (0.0 to 1.0).
    pub confidence: f32,
    /// Classifier that produced this result.
    #[serde(skip)]
    pub tier: DecisionTier,
}

impl ModerationResult {
    /// Creates an allowed result.
    pub fn allow(confidence: f32) -> Self {
        Self {
            allowed: true,
            reason: None,
            confidence: confidence.clamp(0.0, 1.0),
            tier: DecisionTier::Rules,
        }
    }

    /// Creates a rejected result with a reason.
    pub fn reject(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            confidence: confidence.clamp(0.0, 1.0),
            tier: DecisionTier::Rules,
        }
    }

    /// Tags the result with the tier that produced it.
    pub fn with_tier(mut self, tier: DecisionTier) -> Self {
        self.tier = tier;
        self
    }

    /// Returns true if this allowed result should go to human review.
    pub fn requires_review(&self) -> bool {
        requires_review(self)
    }
}

/// Returns true for allowed content whose confidence is below [`REVIEW_THRESHOLD`].
///
/// Rejected content is never flagged; it is already refused.
pub fn requires_review(result: &ModerationResult) -> bool {
    result.allowed && result.confidence < REVIEW_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(allowed: bool, confidence: f32) -> ModerationResult {
        ModerationResult {
            allowed,
            reason: None,
            confidence,
            tier: DecisionTier::Rules,
        }
    }

    #[test]
    fn review_flags_low_confidence_allowed() {
        assert!(requires_review(&result(true, 0.5)));
    }

    #[test]
    fn review_skips_threshold_confidence() {
        assert!(!requires_review(&result(true, 0.6)));
    }

    #[test]
    fn review_skips_rejected_content() {
        assert!(!requires_review(&result(false, 0.1)));
    }

    #[test]
    fn constructors_clamp_confidence() {
        assert_eq!(ModerationResult::allow(1.5).confidence, 1.0);
        assert_eq!(ModerationResult::reject("no", -0.5).confidence, 0.0);
    }

    #[test]
    fn tier_is_not_serialized() {
        let json = serde_json::to_value(ModerationResult::allow(0.7).with_tier(DecisionTier::Ai))
            .unwrap();
        assert_eq!(json, serde_json::json!({"allowed": true, "confidence": 0.7f32}));
    }

    #[test]
    fn reason_is_serialized_when_present() {
        let json = serde_json::to_value(ModerationResult::reject("Please pray to Jesus", 0.9))
            .unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["reason"], "Please pray to Jesus");
    }
}
