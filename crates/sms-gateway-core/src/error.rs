//! Request-level error taxonomy.

use thiserror::Error;

use crate::traits::SmppError;

/// Outcome classification for submit/query requests.
///
/// Transport adapters map each variant to their own status scheme; none of
/// these abort the serving process.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client-caused: missing or malformed fields. The upstream session is
    /// never contacted.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Query for an identifier the upstream does not know.
    #[error("message not found: {0}")]
    NotFound(String),

    /// The upstream session rejected or failed the operation.
    #[error("upstream error: {detail}")]
    Upstream {
        /// Detail reported by the upstream, surfaced to the caller.
        detail: String,
        /// Whether the caller may usefully retry.
        transient: bool,
    },
}

impl GatewayError {
    /// Shorthand for a missing-field validation error.
    #[must_use]
    pub fn missing_field(name: &str) -> Self {
        Self::Validation(format!("missing field: {name}"))
    }
}

impl From<SmppError> for GatewayError {
    fn from(err: SmppError) -> Self {
        match err {
            SmppError::NotFound(id) => Self::NotFound(id),
            other => Self::Upstream {
                transient: other.is_transient(),
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smpp_errors_keep_their_class() {
        let e: GatewayError = SmppError::NotConnected.into();
        assert!(matches!(e, GatewayError::Upstream { transient: true, .. }));

        let e: GatewayError = SmppError::Rejected("bad dest".into()).into();
        assert!(matches!(e, GatewayError::Upstream { transient: false, .. }));

        let e: GatewayError = SmppError::NotFound("m9".into()).into();
        assert!(matches!(e, GatewayError::NotFound(id) if id == "m9"));
    }
}
