//! Error types.
//!
//! A host without a media-query capability is not an error: both entry points
//! degrade to [`ThemePreference::NoPreference`](crate::ThemePreference) or the
//! caller's initial value. These errors only describe a capability that is
//! present but misbehaves.

/// Failure raised by a [`MediaQueryService`](crate::MediaQueryService).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaQueryError {
    /// The service could not evaluate a query.
    #[error("failed to evaluate '{query}': {reason}")]
    Evaluation { query: String, reason: String },

    /// The service refused to register a change listener.
    #[error("failed to subscribe to '{query}': {reason}")]
    Subscribe { query: String, reason: String },

    /// The OS color-scheme detector failed.
    #[error("color scheme detection failed: {0}")]
    Detection(String),
}

impl MediaQueryError {
    /// Create an evaluation error.
    pub fn evaluation(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Evaluation {
            query: query.into(),
            reason: reason.into(),
        }
    }

    /// Create a subscription error.
    pub fn subscribe(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Subscribe {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// A string that is not `light`, `dark` or `no-preference`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color scheme preference '{0}'")]
pub struct ParsePreferenceError(pub String);
