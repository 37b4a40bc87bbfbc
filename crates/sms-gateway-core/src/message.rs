//! Submit and query request/response types.

use serde::{Deserialize, Serialize};

use crate::receipt::DeliveryStatus;

/// Text encoding requested for an outbound message.
///
/// When absent, the upstream's default alphabet (GSM 03.38) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// ISO-8859-1.
    Latin1,
    /// UCS-2 (for non-Latin scripts).
    Ucs2,
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latin1" => Ok(Self::Latin1),
            "ucs2" => Ok(Self::Ucs2),
            other => Err(format!("unsupported encoding: {other}")),
        }
    }
}

/// An outbound message submission, validated and immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Destination number.
    pub to: String,
    /// Source number or sender id.
    pub from: String,
    /// Message body.
    pub text: String,
    /// Optional text encoding override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    /// Ask the upstream to produce a delivery receipt for this message.
    #[serde(default)]
    pub register: bool,
}

/// Successful submit outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Identifier assigned by the upstream service.
    pub message_id: String,
}

/// A delivery-status lookup by message identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Identifier returned by a previous submit.
    pub message_id: String,
}

/// Successful query outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Current state of the message.
    pub status: DeliveryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_parses_known_names() {
        assert_eq!("latin1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("ucs2".parse::<Encoding>().unwrap(), Encoding::Ucs2);
        assert!("utf9".parse::<Encoding>().is_err());
    }

    #[test]
    fn submit_request_defaults() {
        let req: SubmitRequest =
            serde_json::from_str(r#"{"to":"123","from":"x","text":"hi"}"#).unwrap();
        assert!(req.encoding.is_none());
        assert!(!req.register);
    }
}
