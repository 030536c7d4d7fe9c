//! Two-tier classification with fallback.
//!
//! The primary classifier (usually [`AiClassifier`](super::AiClassifier)) is
//! tried first. Any error it returns is reported to a [`FallbackObserver`]
//! and the deterministic [`RuleClassifier`] decides instead, so callers always
//! receive a [`ModerationResult`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::{ClassifierError, DecisionTier, ModerationResult, RuleClassifier};

/// Trait for pluggable content classifiers.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Classifies the given text.
    async fn classify(&self, text: &str) -> Result<ModerationResult, ClassifierError>;

    /// Returns the tier this classifier belongs to.
    fn tier(&self) -> DecisionTier;
}

/// A primary-classifier failure that was recovered by the rules tier.
#[derive(Debug)]
pub struct FallbackEvent<'a> {
    /// Tier that failed.
    pub failed_tier: DecisionTier,
    /// Why it failed.
    pub error: &'a ClassifierError,
    /// Length of the text being classified.
    pub text_len: usize,
}

/// Hook notified about every decision and every fallback.
pub trait FallbackObserver: Send + Sync {
    /// Called when the primary classifier failed and rules took over.
    fn on_fallback(&self, event: &FallbackEvent<'_>);

    /// Called with every final decision.
    fn on_decision(&self, _result: &ModerationResult) {}
}

/// Observer that logs fallbacks as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl FallbackObserver for LogObserver {
    fn on_fallback(&self, event: &FallbackEvent<'_>) {
        warn!(
            tier = event.failed_tier.name(),
            error = %event.error,
            text_len = event.text_len,
            "Classifier unavailable, using rule-based moderation"
        );
    }
}

/// Snapshot of [`CountingObserver`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateStats {
    /// Decisions made by the AI tier.
    pub ai_decisions: u64,
    /// Decisions made by the rules tier.
    pub rule_decisions: u64,
    /// Times the primary tier failed and rules took over.
    pub fallbacks: u64,
    /// Decisions that rejected content.
    pub rejected: u64,
}

/// Observer that counts decisions per tier and logs fallbacks.
#[derive(Debug, Default)]
pub struct CountingObserver {
    ai_decisions: AtomicU64,
    rule_decisions: AtomicU64,
    fallbacks: AtomicU64,
    rejected: AtomicU64,
}

impl CountingObserver {
    /// Creates an observer with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counters.
    pub fn snapshot(&self) -> GateStats {
        GateStats {
            ai_decisions: self.ai_decisions.load(Ordering::Relaxed),
            rule_decisions: self.rule_decisions.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl FallbackObserver for CountingObserver {
    fn on_fallback(&self, event: &FallbackEvent<'_>) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        LogObserver.on_fallback(event);
    }

    fn on_decision(&self, result: &ModerationResult) {
        let counter = match result.tier {
            DecisionTier::Ai => &self.ai_decisions,
            DecisionTier::Rules => &self.rule_decisions,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if !result.allowed {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Classifier that falls back to rules when the primary tier fails.
///
/// Exactly one attempt is made against the primary; there are no retries.
/// Without a primary, the rules decide directly.
pub struct FallbackClassifier {
    primary: Option<Arc<dyn ContentClassifier>>,
    rules: Arc<RuleClassifier>,
    observer: Arc<dyn FallbackObserver>,
}

impl FallbackClassifier {
    /// Creates a classifier that tries `primary` before `rules`.
    pub fn new(primary: Arc<dyn ContentClassifier>, rules: Arc<RuleClassifier>) -> Self {
        Self {
            primary: Some(primary),
            rules,
            observer: Arc::new(LogObserver),
        }
    }

    /// Creates a classifier that only uses rules.
    pub fn rules_only(rules: Arc<RuleClassifier>) -> Self {
        Self {
            primary: None,
            rules,
            observer: Arc::new(LogObserver),
        }
    }

    /// Replaces the fallback observer.
    pub fn with_observer(mut self, observer: Arc<dyn FallbackObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns true if a primary classifier is configured.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Returns the rules tier.
    pub fn rules(&self) -> &RuleClassifier {
        &self.rules
    }

    /// Classifies text. Never fails.
    pub async fn classify(&self, text: &str) -> ModerationResult {
        let result = match self.primary {
            Some(ref primary) => match primary.classify(text).await {
                Ok(result) => result,
                Err(error) => {
                    self.observer.on_fallback(&FallbackEvent {
                        failed_tier: primary.tier(),
                        error: &error,
                        text_len: text.len(),
                    });
                    self.rules.moderate(text)
                }
            },
            None => self.rules.moderate(text),
        };

        debug!(
            tier = result.tier.name(),
            allowed = result.allowed,
            confidence = result.confidence,
            "Moderation decision"
        );
        self.observer.on_decision(&result);
        result
    }
}
