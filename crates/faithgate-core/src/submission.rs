//! Screening of user submissions (posts, comments, prayer requests, captions).
//!
//! All user-authored fields are screened as one text so a term in the title
//! rejects the whole submission. Captions carry an extra length requirement
//! that is checked before any classification, and are judged by the rule
//! classifier alone.

use serde::{Deserialize, Serialize};

use crate::moderation::ModerationResult;

/// Minimum caption length after trimming, in UTF-16 code units.
pub const MIN_CAPTION_LEN: usize = 6;

/// Separator between fields in the screening text.
pub const FIELD_SEPARATOR: &str = "\n";

/// Kind of user-authored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Feed post.
    Post,
    /// Comment on a post.
    Comment,
    /// Prayer request.
    PrayerRequest,
    /// Caption for an embedded video.
    Caption,
}

impl ContentKind {
    /// Returns true if this kind bypasses the AI backend.
    pub fn is_rules_only(&self) -> bool {
        matches!(self, ContentKind::Caption)
    }

    /// Message shown when content is rejected without a classifier reason.
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            ContentKind::Post => "Please keep your post centered on Jesus or Scripture.",
            ContentKind::Comment => "Please keep your comment centered on Jesus or Scripture.",
            ContentKind::PrayerRequest => {
                "Please keep your prayer request centered on Jesus or Scripture."
            }
            ContentKind::Caption => {
                "Please ensure your caption honors Jesus and our community guidelines"
            }
        }
    }
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// Caption missing or too short.
    CaptionRequired,
    /// Classifier rejected the content.
    ContentRejected,
    /// Classifier rejected a caption.
    FaithOrSafetyFail,
}

/// User-authored content awaiting moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// What is being submitted.
    pub kind: ContentKind,
    /// Optional title.
    #[serde(default)]
    pub title: Option<String>,
    /// Main text.
    #[serde(default)]
    pub body: String,
}

impl Submission {
    /// Creates a submission with only a body.
    pub fn new(kind: ContentKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            body: body.into(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the trimmed, non-empty fields joined for screening.
    pub fn screening_text(&self) -> String {
        self.title
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.body.as_str()))
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }

    /// Checks requirements that do not need a classifier.
    pub fn precheck(&self) -> Result<(), Rejection> {
        if self.kind == ContentKind::Caption
            && self.body.trim().encode_utf16().count() < MIN_CAPTION_LEN
        {
            return Err(Rejection {
                code: RejectionCode::CaptionRequired,
                reason: "Please add a short Christ-centered caption".to_string(),
            });
        }
        Ok(())
    }

    /// Maps a moderation result for this submission to a verdict.
    ///
    /// Captions are never sent to review, and a rejected caption always gets
    /// the fixed caption message.
    pub fn verdict(&self, result: &ModerationResult) -> Verdict {
        if self.kind == ContentKind::Caption {
            return if result.allowed {
                Verdict::Publish
            } else {
                Verdict::Reject(Rejection {
                    code: RejectionCode::FaithOrSafetyFail,
                    reason: self.kind.fallback_reason().to_string(),
                })
            };
        }

        if !result.allowed {
            return Verdict::Reject(Rejection {
                code: RejectionCode::ContentRejected,
                reason: result
                    .reason
                    .clone()
                    .unwrap_or_else(|| self.kind.fallback_reason().to_string()),
            });
        }

        if result.requires_review() {
            Verdict::Review
        } else {
            Verdict::Publish
        }
    }
}

/// A refused submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Machine-readable code.
    pub code: RejectionCode,
    /// Message for the author.
    pub reason: String,
}

/// Outcome of screening a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Allowed with enough confidence.
    Publish,
    /// Allowed, but a human should double-check it.
    Review,
    /// Refused; do not persist.
    Reject(Rejection),
}

impl Verdict {
    /// Returns true unless the submission was refused.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Verdict::Reject(_))
    }

    /// Returns a short name for logging and API responses.
    pub fn name(&self) -> &'static str {
        match self {
            Verdict::Publish => "publish",
            Verdict::Review => "review",
            Verdict::Reject(_) => "reject",
        }
    }
}
