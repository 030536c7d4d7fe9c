//! Faith-alignment content moderation.
//!
//! This module provides the rule-based classifier, the AI classifier adapter,
//! and the fallback composition between them.

pub(crate) mod ai;
mod config;
mod fallback;
mod result;
mod rules;

pub use ai::{
    AiClassifier, AiClassifierConfig, ClassifierError, DEFAULT_AI_CONFIDENCE, DEFAULT_TIMEOUT_MS,
};
pub use config::{ConfigError, ModerationConfig, DEFAULT_REJECTION_REASON};
pub use fallback::{
    ContentClassifier, CountingObserver, FallbackClassifier, FallbackEvent, FallbackObserver,
    GateStats, LogObserver,
};
pub use result::{requires_review, DecisionTier, ModerationResult, REVIEW_THRESHOLD};
pub use rules::{
    moderate_content, scale_confidence, RuleClassifier, BASELINE_CONFIDENCE, BLOCKED_CONFIDENCE,
    CONTEXTUAL_CONFIDENCE, MAX_ALLOWED_CONFIDENCE,
};
