//! The moderation gate used by content-creation flows.
//!
//! Builds the rule classifier from a [`ModerationConfig`], optionally puts an
//! [`AiClassifier`] in front of it, and counts decisions per tier.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::moderation::{
    AiClassifier, AiClassifierConfig, ClassifierError, ConfigError, CountingObserver,
    FallbackClassifier, FallbackObserver, GateStats, ModerationConfig, ModerationResult,
    RuleClassifier,
};
use crate::submission::{Submission, Verdict};

/// Errors from building a moderation gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// The term tables could not be loaded.
    #[error("moderation config error: {0}")]
    Config(#[from] ConfigError),

    /// The AI classifier could not be created.
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Configuration for the moderation gate.
#[derive(Debug, Clone, Default)]
pub struct GateConfig {
    /// Term tables for the rule classifier.
    pub moderation: ModerationConfig,
    /// AI backend (None = rules only).
    pub ai: Option<AiClassifierConfig>,
}

impl GateConfig {
    /// Creates a rules-only config with the built-in tables.
    pub fn rules_only() -> Self {
        Self::default()
    }

    /// Sets the AI backend.
    pub fn with_ai(mut self, ai: AiClassifierConfig) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Sets the term tables.
    pub fn with_moderation(mut self, moderation: ModerationConfig) -> Self {
        self.moderation = moderation;
        self
    }
}

/// Outcome of screening a submission.
#[derive(Debug, Clone)]
pub struct Screening {
    /// What the caller should do.
    pub verdict: Verdict,
    /// Classifier result (None if the submission failed its precheck).
    pub result: Option<ModerationResult>,
}

/// Entry point for moderating user content.
pub struct ModerationGate {
    classifier: FallbackClassifier,
    stats: Arc<CountingObserver>,
}

impl ModerationGate {
    /// Creates a gate from the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        let rules = RuleClassifier::with_config(&config.moderation)?;
        let ai = match config.ai {
            Some(ai_config) => {
                info!(endpoint = %ai_config.endpoint, "AI classifier enabled");
                Some(AiClassifier::new(ai_config)?)
            }
            None => {
                info!("AI classifier disabled, using rule-based moderation only");
                None
            }
        };

        Ok(Self::assemble(rules, ai))
    }

    /// Creates a rules-only gate with the built-in tables.
    pub fn rules_only() -> Self {
        Self::assemble(RuleClassifier::new(), None)
    }

    fn assemble(rules: RuleClassifier, ai: Option<AiClassifier>) -> Self {
        let rules = Arc::new(rules);
        let stats = Arc::new(CountingObserver::new());

        let classifier = match ai {
            Some(ai) => FallbackClassifier::new(Arc::new(ai), rules),
            None => FallbackClassifier::rules_only(rules),
        }
        .with_observer(stats.clone());

        Self { classifier, stats }
    }

    /// Validates text with the AI backend, falling back to rules. Never fails.
    pub async fn validate_content(&self, text: &str) -> ModerationResult {
        self.classifier.classify(text).await
    }

    /// Validates text with the rule classifier only.
    pub fn moderate_content(&self, text: &str) -> ModerationResult {
        self.classifier.rules().moderate(text)
    }

    /// Screens a submission and decides whether to publish, review, or reject it.
    ///
    /// Captions are checked by the rule classifier alone.
    pub async fn screen(&self, submission: &Submission) -> Screening {
        if let Err(rejection) = submission.precheck() {
            return Screening {
                verdict: Verdict::Reject(rejection),
                result: None,
            };
        }

        let text = submission.screening_text();
        let result = if submission.kind.is_rules_only() {
            let result = self.moderate_content(&text);
            self.stats.on_decision(&result);
            result
        } else {
            self.validate_content(&text).await
        };
        Screening {
            verdict: submission.verdict(&result),
            result: Some(result),
        }
    }

    /// Returns true if an AI backend is configured.
    pub fn has_ai(&self) -> bool {
        self.classifier.has_primary()
    }

    /// Returns decision counters.
    pub fn stats(&self) -> GateStats {
        self.stats.snapshot()
    }
}
