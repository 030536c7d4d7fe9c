//! Term tables for faith-alignment moderation.
//!
//! The built-in tables are compiled into the crate. A JSON file with the same
//! field names can replace any of them at startup; once loaded the config is
//! never mutated.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned when a blocked term is found.
pub const DEFAULT_REJECTION_REASON: &str = "We welcome all, but this space is specifically for \
Christian prayer to Jesus. Please direct prayers to Jesus Christ, our Savior and mediator.";

/// Terms that indicate non-Christian religious practices.
const BLOCKED_TERMS: &[&str] = &[
    "allah",
    "muhammad",
    "quran",
    "mosque",
    "islamic prayer",
    "vishnu",
    "shiva",
    "krishna",
    "brahma",
    "hindu gods",
    "hindu prayer",
    "buddha as deity",
    "buddhist prayer",
    "dharma prayer",
    "meditation prayer",
    "athena",
    "zeus",
    "thor",
    "odin",
    "apollo",
    "greek gods",
    "gaia worship",
    "mother earth prayer",
    "nature deity",
    "tarot reading",
    "horoscope prayer",
    "astrology prayer",
    "ouija",
    "séance",
    "spirit guide",
    "channeling spirits",
    "witchcraft",
    "spell casting",
    "magic ritual",
    "wiccan",
    "occult invocation",
    "pagan ritual",
    "wiccan prayer",
    "ancestral worship",
    "ancestor spirits",
    "chakra alignment prayer",
    "crystal healing prayer",
    "new age spirituality",
    "universe prayer",
    "hail mary",
    "virgin mary prayer",
    "mother mary intercession",
    "saint intercession",
    "pray to saints",
    "rosary prayer",
    "catholic saints",
    "our lady of",
    "blessed virgin",
    "pope blessing",
    "papal prayer",
    "mass prayer",
    "purgatory prayer",
    "saint joseph prayer",
    "saint michael prayer",
    "immaculate conception",
    "assumption of mary",
    "sacred heart of mary",
    "queen of heaven",
];

/// Terms that raise confidence that content is devotional.
const CHRISTIAN_TERMS: &[&str] = &[
    "jesus",
    "christ",
    "lord jesus",
    "savior",
    "god the father",
    "heavenly father",
    "abba father",
    "holy spirit",
    "holy ghost",
    "comforter",
    "bible",
    "scripture",
    "word of god",
    "matthew",
    "mark",
    "luke",
    "john",
    "psalms",
    "proverbs",
    "romans",
    "corinthians",
    "ephesians",
    "philippians",
    "christian",
    "christianity",
    "gospel",
    "salvation",
    "cross",
    "crucifixion",
    "resurrection",
    "easter",
    "christmas",
    "nativity",
    "bethlehem",
    "calvary",
    "church",
    "pastor",
    "minister",
    "congregation",
    "baptism",
    "communion",
    "eucharist",
    "prayer in jesus name",
    "amen",
    "hallelujah",
    "praise god",
];

/// Testimonial and educational phrases that may mention other religions.
const CONTEXTUAL_ALLOWED_PHRASES: &[&str] = &[
    "came from islam to christ",
    "left hinduism for jesus",
    "testimony about leaving",
    "discussion about other religions",
    "sharing the gospel with",
    "missionary work among",
    "converted from",
    "used to practice but now",
];

/// Errors from loading a moderation config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse the config file.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A phrase was empty after trimming.
    #[error("empty phrase in {0}")]
    EmptyPhrase(&'static str),

    /// No blocked terms configured.
    #[error("blocked_terms must not be empty")]
    NoBlockedTerms,

    /// A term table could not be compiled for matching.
    #[error("failed to compile term table: {0}")]
    Pattern(#[from] regex::Error),
}

/// Moderation term tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Phrases whose presence rejects content.
    pub blocked_terms: Vec<String>,
    /// Phrases that raise confidence for allowed content.
    pub christian_terms: Vec<String>,
    /// Phrases that allow content even when blocked terms are present.
    pub contextual_allowed_phrases: Vec<String>,
    /// Message returned on rejection.
    pub rejection_reason: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            blocked_terms: to_owned(BLOCKED_TERMS),
            christian_terms: to_owned(CHRISTIAN_TERMS),
            contextual_allowed_phrases: to_owned(CONTEXTUAL_ALLOWED_PHRASES),
            rejection_reason: DEFAULT_REJECTION_REASON.to_string(),
        }
    }
}

impl ModerationConfig {
    /// Parses a config from JSON. Fields missing from the document keep the
    /// built-in tables.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.normalized()
    }

    /// Loads a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Trims and lower-cases every phrase, rejecting empty ones.
    pub fn normalized(self) -> Result<Self, ConfigError> {
        if self.blocked_terms.is_empty() {
            return Err(ConfigError::NoBlockedTerms);
        }

        Ok(Self {
            blocked_terms: normalize_phrases(self.blocked_terms, "blocked_terms")?,
            christian_terms: normalize_phrases(self.christian_terms, "christian_terms")?,
            contextual_allowed_phrases: normalize_phrases(
                self.contextual_allowed_phrases,
                "contextual_allowed_phrases",
            )?,
            rejection_reason: self.rejection_reason,
        })
    }
}

fn to_owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

fn normalize_phrases(
    phrases: Vec<String>,
    field: &'static str,
) -> Result<Vec<String>, ConfigError> {
    phrases
        .into_iter()
        .map(|p| {
            let phrase = p.trim().to_lowercase();
            if phrase.is_empty() {
                Err(ConfigError::EmptyPhrase(field))
            } else {
                Ok(phrase)
            }
        })
        .collect()
}
