//! Deterministic term classifier.
//!
//! Each phrase table is compiled into a [`RegexSet`] of escaped literals, so a
//! single pass over the lower-cased input reports which distinct configured
//! phrases occur as substrings. Matching is plain containment: there are no
//! word boundaries, so "thor" also matches inside "author".

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::RegexSet;
use tracing::debug;

use super::fallback::ContentClassifier;
use super::{ClassifierError, ConfigError, DecisionTier, ModerationConfig, ModerationResult};

/// Confidence for content allowed by a contextual phrase.
pub const CONTEXTUAL_CONFIDENCE: f32 = 0.8;

/// Confidence for content rejected by a blocked term.
pub const BLOCKED_CONFIDENCE: f32 = 0.9;

/// Confidence for allowed content with no Christian terms.
pub const BASELINE_CONFIDENCE: f32 = 0.5;

/// Upper bound for allowed-content confidence.
pub const MAX_ALLOWED_CONFIDENCE: f32 = 0.95;

// Confidence is accumulated in whole percent so 0.5 + 0.1 lands exactly on 0.6.
const BASELINE_PERCENT: usize = 50;
const PER_TERM_PERCENT: usize = 10;
const MAX_PERCENT: usize = 95;

/// A phrase table compiled for substring matching.
struct PhraseSet {
    phrases: Vec<String>,
    set: RegexSet,
}

impl PhraseSet {
    fn new(phrases: &[String]) -> Result<Self, regex::Error> {
        let patterns: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
        // Fails when the compiled set exceeds the regex size limit.
        let set = RegexSet::new(&patterns)?;
        Ok(Self {
            phrases: phrases.to_vec(),
            set,
        })
    }

    fn any_in(&self, text: &str) -> bool {
        self.set.is_match(text)
    }

    fn count_in(&self, text: &str) -> usize {
        self.set.matches(text).iter().count()
    }

    fn found_in<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.set
            .matches(text)
            .into_iter()
            .map(|i| self.phrases[i].as_str())
            .collect()
    }
}

/// Rule-based faith-alignment classifier.
///
/// Pure and synchronous; safe to share across tasks.
pub struct RuleClassifier {
    blocked: PhraseSet,
    christian: PhraseSet,
    contextual: PhraseSet,
    rejection_reason: String,
}

impl RuleClassifier {
    /// Creates a classifier with the built-in term tables.
    pub fn new() -> Self {
        Self::with_config(&ModerationConfig::default()).expect("Invalid built-in term tables")
    }

    /// Creates a classifier from a loaded config.
    ///
    /// Returns [`ConfigError::Pattern`] when a table is too large to compile.
    pub fn with_config(config: &ModerationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            blocked: PhraseSet::new(&config.blocked_terms)?,
            christian: PhraseSet::new(&config.christian_terms)?,
            contextual: PhraseSet::new(&config.contextual_allowed_phrases)?,
            rejection_reason: config.rejection_reason.clone(),
        })
    }

    /// Moderates the given text.
    ///
    /// 1. A contextual phrase allows the text outright.
    /// 2. Any blocked term rejects it.
    /// 3. Otherwise confidence scales with the number of distinct Christian terms.
    pub fn moderate(&self, text: &str) -> ModerationResult {
        let text_lower = text.to_lowercase();

        if self.contextual.any_in(&text_lower) {
            return ModerationResult::allow(CONTEXTUAL_CONFIDENCE);
        }

        if self.blocked.any_in(&text_lower) {
            debug!(terms = ?self.blocked_terms_in(text), "Blocked terms found");
            return ModerationResult::reject(self.rejection_reason.clone(), BLOCKED_CONFIDENCE);
        }

        let christian_terms = self.christian.count_in(&text_lower);
        ModerationResult::allow(scale_confidence(christian_terms))
    }

    /// Returns the blocked terms present in the text, ignoring contextual phrases.
    pub fn blocked_terms_in(&self, text: &str) -> Vec<&str> {
        self.blocked.found_in(&text.to_lowercase())
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentClassifier for RuleClassifier {
    async fn classify(&self, text: &str) -> Result<ModerationResult, ClassifierError> {
        Ok(self.moderate(text))
    }

    fn tier(&self) -> DecisionTier {
        DecisionTier::Rules
    }
}

/// Confidence for allowed content containing `christian_terms` distinct terms:
/// `min(0.95, 0.5 + 0.1 * n)`.
pub fn scale_confidence(christian_terms: usize) -> f32 {
    let percent = christian_terms
        .saturating_mul(PER_TERM_PERCENT)
        .saturating_add(BASELINE_PERCENT)
        .min(MAX_PERCENT);
    percent as f32 / 100.0
}

/// Moderates text with the built-in term tables.
pub fn moderate_content(text: &str) -> ModerationResult {
    static DEFAULT: OnceLock<RuleClassifier> = OnceLock::new();
    DEFAULT.get_or_init(RuleClassifier::new).moderate(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::DEFAULT_REJECTION_REASON;

    fn classifier() -> RuleClassifier {
        RuleClassifier::new()
    }

    // === Contextual Allowance ===

    #[test]
    fn contextual_phrase_overrides_blocked_terms() {
        let result = classifier().moderate(
            "I came from Islam to Christ and now worship Allah's creation through Jesus",
        );
        assert!(result.allowed);
        assert_eq!(result.confidence, CONTEXTUAL_CONFIDENCE);
        assert!(result.reason.is_none());
    }

    #[test]
    fn missionary_phrase_is_allowed() {
        let result = classifier().moderate("Sharing the gospel with friends at the mosque");
        assert!(result.allowed);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn contextual_phrase_alone_is_allowed() {
        let result = classifier().moderate("I converted from atheism last year");
        assert!(result.allowed);
        assert_eq!(result.confidence, 0.8);
    }

    // === Blocked Terms ===

    #[test]
    fn blocked_term_rejects() {
        let result = classifier().moderate("Please say hail mary for me");
        assert!(!result.allowed);
        assert_eq!(result.reason.as_deref(), Some(DEFAULT_REJECTION_REASON));
        assert_eq!(result.confidence, BLOCKED_CONFIDENCE);
    }

    #[test]
    fn multiple_blocked_terms_keep_fixed_confidence() {
        let result = classifier().moderate("zeus, odin and apollo tarot reading");
        assert!(!result.allowed);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn blocked_term_wins_over_christian_terms() {
        let result = classifier().moderate("Jesus and the Quran");
        assert!(!result.allowed);
    }

    #[test]
    fn case_insensitive_blocked_terms() {
        for text in ["ALLAH", "Allah", "allah"] {
            let result = classifier().moderate(text);
            assert!(!result.allowed, "expected {text} to be blocked");
            assert_eq!(result.confidence, 0.9);
        }
    }

    #[test]
    fn substring_matches_inside_longer_words() {
        // "thor" inside "author": containment without word boundaries.
        let result = classifier().moderate("The author of this devotional");
        assert!(!result.allowed);
    }

    #[test]
    fn non_ascii_blocked_term_matches() {
        let result = classifier().moderate("Join our SÉANCE tonight");
        assert!(!result.allowed);
    }

    #[test]
    fn blocked_terms_in_reports_matches() {
        let classifier = classifier();
        let found = classifier.blocked_terms_in("Zeus and Odin");
        assert_eq!(found, vec!["zeus", "odin"]);
    }

    // === Confidence Scoring ===

    #[test]
    fn neutral_content_gets_baseline() {
        let result = classifier().moderate("Happy birthday to my friend");
        assert!(result.allowed);
        assert_eq!(result.confidence, BASELINE_CONFIDENCE);
        assert!(result.reason.is_none());
    }

    #[test]
    fn empty_input_gets_baseline() {
        let result = classifier().moderate("");
        assert!(result.allowed);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn single_christian_term_scores_point_six() {
        let result = classifier().moderate("Jesus is Lord");
        assert!(result.allowed);
        assert_eq!(result.confidence, 0.6);
        assert!(!result.requires_review());
    }

    #[test]
    fn overlapping_terms_count_per_phrase() {
        // "christ" and "christian" both occur; each phrase counts once.
        let result = classifier().moderate("christian christian christian");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn many_christian_terms_are_capped() {
        let result =
            classifier().moderate("Jesus Christ our Savior, Holy Spirit guide us, amen");
        assert!(result.allowed);
        assert_eq!(result.confidence, MAX_ALLOWED_CONFIDENCE);
    }

    #[test]
    fn scale_confidence_is_monotonic_and_capped() {
        assert_eq!(scale_confidence(0), 0.5);
        assert_eq!(scale_confidence(1), 0.6);
        assert_eq!(scale_confidence(2), 0.7);
        assert_eq!(scale_confidence(4), 0.9);
        assert_eq!(scale_confidence(5), 0.95);
        assert_eq!(scale_confidence(40), 0.95);
        assert_eq!(scale_confidence(usize::MAX), 0.95);
    }

    // === Custom Config ===

    #[test]
    fn custom_config_is_used() {
        let config = ModerationConfig::from_json(
            r#"{"blocked_terms": ["baal"], "rejection_reason": "Not here."}"#,
        )
        .unwrap();
        let classifier = RuleClassifier::with_config(&config).unwrap();

        let result = classifier.moderate("Offerings to Baal");
        assert!(!result.allowed);
        assert_eq!(result.reason.as_deref(), Some("Not here."));

        // Built-in blocked terms are replaced, not merged.
        assert!(classifier.moderate("zeus").allowed);
    }

    #[test]
    fn empty_christian_table_always_scores_baseline() {
        let config = ModerationConfig {
            christian_terms: Vec::new(),
            ..ModerationConfig::default()
        };
        let result = RuleClassifier::with_config(&config)
            .unwrap()
            .moderate("Jesus Christ");
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn oversized_blocked_table_fails_to_load() {
        let mut blocked_terms: Vec<String> =
            (0..200_000).map(|i| format!("idol offering {i}")).collect();
        blocked_terms.push("baal".to_string());
        let config = ModerationConfig {
            blocked_terms,
            ..ModerationConfig::default()
        }
        .normalized()
        .unwrap();

        let err = RuleClassifier::with_config(&config).err();
        assert!(matches!(err, Some(ConfigError::Pattern(_))));
    }

    // === Shared Entry Point ===

    #[test]
    fn moderate_content_matches_default_classifier() {
        let text = "Praise God for the resurrection";
        assert_eq!(moderate_content(text), classifier().moderate(text));
    }

    #[test]
    fn results_are_tagged_as_rules() {
        assert_eq!(classifier().moderate("amen").tier, DecisionTier::Rules);
    }

    #[test]
    fn classify_trait_never_fails() {
        let classifier = classifier();
        let result = tokio_test::block_on(classifier.classify("hail mary")).unwrap();
        assert!(!result.allowed);
    }
}
