//! Application state for the API server.

use std::sync::Arc;

use faithgate_core::ModerationGate;

/// Default maximum text size accepted per request.
pub const DEFAULT_MAX_TEXT_BYTES: usize = 64 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Moderation gate shared by all requests.
    pub gate: Arc<ModerationGate>,
    /// Maximum text size accepted per request.
    pub max_text_bytes: usize,
}

impl AppState {
    /// Creates a new application state with the given gate.
    pub fn new(gate: ModerationGate) -> Self {
        Self {
            gate: Arc::new(gate),
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }

    /// Creates application state with a rules-only gate.
    pub fn rules_only() -> Self {
        Self::new(ModerationGate::rules_only())
    }

    /// Sets the maximum text size.
    pub fn with_max_text_bytes(mut self, max_text_bytes: usize) -> Self {
        self.max_text_bytes = max_text_bytes;
        self
    }
}
