//! Upstream session abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::message::SubmitRequest;
use crate::receipt::DeliveryStatus;

/// Upstream connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnState {
    /// Bound and ready to carry traffic.
    Connected,
    /// Connection lost; the session is reconnecting.
    Disconnected,
    /// TCP connection attempt failed.
    ConnectionFailed,
    /// Connected but the bind handshake was refused.
    BindFailed,
}

/// One upstream connection-status transition, for the bootstrap layer to log.
#[derive(Debug, Clone)]
pub struct ConnEvent {
    /// New connection state.
    pub status: ConnState,
    /// Error detail accompanying the transition, if any.
    pub error: Option<String>,
}

/// Failure reported by the upstream session.
#[derive(Debug, Clone, Error)]
pub enum SmppError {
    /// No bound connection is currently available.
    #[error("not connected to upstream")]
    NotConnected,
    /// The upstream did not answer within its response window.
    #[error("upstream request timed out")]
    Timeout,
    /// The upstream rejected the operation.
    #[error("rejected by upstream: {0}")]
    Rejected(String),
    /// Status query for an identifier the upstream does not know.
    #[error("unknown message id: {0}")]
    NotFound(String),
}

impl SmppError {
    /// Whether the caller may usefully retry the same operation.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Timeout)
    }
}

/// A long-lived session to the upstream SMPP service.
///
/// Implementations receive a [`crate::DeliverySink`] at construction time and
/// push every inbound delivery receipt into it; the sink is the only receipt
/// listener and is never reassigned. The gateway core treats the wire
/// protocol as opaque.
#[async_trait]
pub trait SmppSession: Send + Sync {
    /// Start (or restart) the session and return its connection-status
    /// events. Called once, at endpoint registration time.
    fn bind(&self) -> mpsc::Receiver<ConnEvent>;

    /// Submit an outbound message, returning the upstream-assigned id.
    ///
    /// # Errors
    /// Returns [`SmppError`] when the upstream rejects or fails the submit.
    async fn submit(&self, req: &SubmitRequest) -> Result<String, SmppError>;

    /// Look up the delivery status of a previously submitted message.
    ///
    /// # Errors
    /// Returns [`SmppError::NotFound`] for unknown identifiers, other
    /// variants for upstream failures.
    async fn query(&self, message_id: &str) -> Result<DeliveryStatus, SmppError>;
}
