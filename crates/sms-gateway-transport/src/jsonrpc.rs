//! JSON-RPC framing for the WebSocket endpoints.
//!
//! Minimal request/response framing in the style of classic JSON-RPC over
//! a persistent socket: ids are echoed back verbatim (number or string),
//! params travel as a positional array, and both `result` and `error` are
//! always present with `null` filling the unused one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Procedure name for message submission.
pub const SUBMIT_METHOD: &str = "sms.submit";
/// Procedure name for delivery-status lookup.
pub const QUERY_METHOD: &str = "sms.query";

/// One remote call, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Call identifier, echoed in the response. `null` for calls whose
    /// response the caller discards.
    #[serde(default)]
    pub id: Value,
    /// Procedure name.
    pub method: String,
    /// Positional arguments; this protocol uses at most one.
    #[serde(default)]
    pub params: Vec<Value>,
}

impl Request {
    /// Build an outbound call with a single argument.
    ///
    /// # Errors
    /// Returns an error if the argument does not serialize.
    pub fn call<T: Serialize>(method: &str, arg: &T, id: u64) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Value::from(id),
            method: method.to_string(),
            params: vec![serde_json::to_value(arg)?],
        })
    }

    /// The single positional argument, if present.
    #[must_use]
    pub fn arg(&self) -> Option<&Value> {
        self.params.first()
    }
}

/// Reply to one [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Identifier of the call being answered.
    pub id: Value,
    /// Call result; `null` when `error` is set.
    pub result: Value,
    /// Error detail; `null` on success.
    pub error: Option<String>,
}

impl Response {
    /// Successful reply.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    /// Failed reply.
    #[must_use]
    pub fn failure(id: Value, error: impl Into<String>) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_with_defaults() {
        let req: Request = serde_json::from_str(r#"{"method":"sms.query"}"#).unwrap();
        assert_eq!(req.method, QUERY_METHOD);
        assert_eq!(req.id, Value::Null);
        assert!(req.arg().is_none());
    }

    #[test]
    fn request_id_survives_roundtrip() {
        for raw in [
            r#"{"id":7,"method":"sms.submit","params":[{"to":"1"}]}"#,
            r#"{"id":"abc","method":"sms.submit","params":[]}"#,
        ] {
            let req: Request = serde_json::from_str(raw).unwrap();
            let back: Request = serde_json::from_str(&serde_json::to_string(&req).unwrap()).unwrap();
            assert_eq!(req, back);
        }
    }

    #[test]
    fn response_always_carries_both_fields() {
        let ok = Response::success(Value::from(1), Value::from("x"));
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["result"], "x");
        assert_eq!(json["error"], Value::Null);

        let err = Response::failure(Value::from(2), "boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["result"], Value::Null);
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn call_wraps_single_argument() {
        let req = Request::call(SUBMIT_METHOD, &serde_json::json!({"to": "123"}), 9).unwrap();
        assert_eq!(req.id, Value::from(9));
        assert_eq!(req.arg().unwrap()["to"], "123");
    }
}
