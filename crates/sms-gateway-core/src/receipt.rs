//! Delivery receipts produced by the upstream receive path.

use serde::{Deserialize, Serialize};

/// Final or intermediate state of a submitted message, as reported by the
/// upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// In transit towards the destination.
    Enroute,
    /// Delivered to the destination.
    Delivered,
    /// Validity period expired before delivery.
    Expired,
    /// Deleted by the upstream service.
    Deleted,
    /// Delivery failed permanently.
    Undeliverable,
    /// Accepted by the destination (e.g. read manually).
    Accepted,
    /// Rejected by the upstream service.
    Rejected,
    /// State not recognized.
    Unknown,
}

impl DeliveryStatus {
    /// Whether this state is terminal (no further receipts expected).
    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Enroute | Self::Unknown)
    }
}

/// A delivery receipt for one previously submitted message.
///
/// Immutable once constructed; broadcast copies it into every registered
/// subscriber inbox, so it stays cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Identifier assigned by the upstream service at submit time.
    pub message_id: String,
    /// Reported message state.
    pub status: DeliveryStatus,
    /// Receipt arrival time (Unix epoch seconds).
    pub timestamp: i64,
    /// Raw receipt text as carried on the wire.
    pub raw: String,
}

impl Receipt {
    /// Create a receipt stamped with the current time.
    #[must_use]
    pub fn new(message_id: impl Into<String>, status: DeliveryStatus, raw: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            status,
            timestamp: now(),
            raw: raw.into(),
        }
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
