//! Faithgate Core - Faith-alignment moderation for community content.
//!
//! This crate provides the content-moderation gate used before posts,
//! comments, prayer requests, and captions are persisted:
//!
//! - [`moderation::RuleClassifier`] - deterministic term rules with contextual overrides
//! - [`moderation::AiClassifier`] - adapter for an external text-classification service
//! - [`moderation::FallbackClassifier`] - AI first, rules on any failure
//! - [`gate::ModerationGate`] - the entry point used by content-creation flows
//!
//! ## Example
//!
//! ```
//! use faithgate_core::moderation::{moderate_content, requires_review};
//!
//! let result = moderate_content("Jesus is Lord");
//! assert!(result.allowed);
//! assert!(!requires_review(&result));
//! ```

pub mod gate;
pub mod moderation;
pub mod submission;

pub use gate::{GateConfig, GateError, ModerationGate, Screening};
pub use moderation::{moderate_content, requires_review, ModerationResult};
pub use submission::{ContentKind, Submission, Verdict};
