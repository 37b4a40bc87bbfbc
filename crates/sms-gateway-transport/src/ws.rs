//! Pull-style WebSocket JSON-RPC adapter: the client calls the bridge.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use serde_json::Value;
use sms_gateway_bridge::RequestBridge;
use sms_gateway_core::{QueryRequest, SubmitRequest};

use crate::jsonrpc::{QUERY_METHOD, Request, Response, SUBMIT_METHOD};
use crate::router::AppState;

/// `GET {prefix}/ws/jsonrpc` - upgrade and serve calls off the socket.
pub async fn ws_jsonrpc(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Requests are read, dispatched and answered one at a time, so calls on a
/// single connection are naturally serialized. No pool registration here.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    while let Some(msg) = socket.recv().await {
        let text = match msg {
            Ok(Message::Text(t)) => t,
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s.into(),
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("websocket error: {e}");
                break;
            }
        };

        // A malformed frame gets an error response, not a close: the peer
        // may have more calls queued.
        let response = match serde_json::from_str::<Request>(&text) {
            Ok(request) => dispatch(&state.bridge, request).await,
            Err(e) => Response::failure(Value::Null, format!("invalid request: {e}")),
        };

        let json = match serde_json::to_string(&response) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("failed to serialize response: {e}");
                continue;
            }
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Decode one call, run it against the bridge, encode the outcome.
pub(crate) async fn dispatch(bridge: &Arc<RequestBridge>, request: Request) -> Response {
    let Request { id, method, params } = request;
    let arg = params.into_iter().next().unwrap_or(Value::Null);

    match method.as_str() {
        SUBMIT_METHOD => match serde_json::from_value::<SubmitRequest>(arg) {
            Ok(req) => match bridge.submit(&req).await {
                Ok(result) => success(id, &result),
                Err(e) => Response::failure(id, e.to_string()),
            },
            Err(e) => Response::failure(id, format!("invalid params: {e}")),
        },
        QUERY_METHOD => match serde_json::from_value::<QueryRequest>(arg) {
            Ok(req) => match bridge.query(&req).await {
                Ok(result) => success(id, &result),
                Err(e) => Response::failure(id, e.to_string()),
            },
            Err(e) => Response::failure(id, format!("invalid params: {e}")),
        },
        other => Response::failure(id, format!("unknown method: {other}")),
    }
}

fn success<T: serde::Serialize>(id: Value, result: &T) -> Response {
    match serde_json::to_value(result) {
        Ok(value) => Response::success(id, value),
        Err(e) => Response::failure(Value::Null, format!("failed to encode result: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sms_gateway_core::{ConnEvent, DeliveryStatus, SmppError, SmppSession};
    use tokio::sync::mpsc;

    use super::*;

    struct StubSession;

    #[async_trait]
    impl SmppSession for StubSession {
        fn bind(&self) -> mpsc::Receiver<ConnEvent> {
            let (_tx, rx) = mpsc::channel(1);
            rx
        }

        async fn submit(&self, _req: &SubmitRequest) -> Result<String, SmppError> {
            Ok("abc".to_string())
        }

        async fn query(&self, message_id: &str) -> Result<DeliveryStatus, SmppError> {
            match message_id {
                "m1" => Ok(DeliveryStatus::Delivered),
                other => Err(SmppError::NotFound(other.to_string())),
            }
        }
    }

    fn bridge() -> Arc<RequestBridge> {
        Arc::new(RequestBridge::new(Arc::new(StubSession)))
    }

    fn parse(raw: &str) -> Request {
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn submit_call_round_trips() {
        let raw = r#"{"id":1,"method":"sms.submit","params":[{"to":"123","from":"x","text":"y"}]}"#;
        let response = dispatch(&bridge(), parse(raw)).await;
        assert_eq!(response.id, Value::from(1));
        assert!(response.error.is_none());
        assert_eq!(response.result["message_id"], "abc");
    }

    #[tokio::test]
    async fn validation_error_becomes_call_error() {
        let raw = r#"{"id":2,"method":"sms.submit","params":[{"to":"","from":"x","text":"y"}]}"#;
        let response = dispatch(&bridge(), parse(raw)).await;
        assert_eq!(response.id, Value::from(2));
        assert!(response.error.as_deref().unwrap().contains("missing field"));
    }

    #[tokio::test]
    async fn query_known_and_unknown_ids() {
        let raw = r#"{"id":3,"method":"sms.query","params":[{"message_id":"m1"}]}"#;
        let response = dispatch(&bridge(), parse(raw)).await;
        assert_eq!(response.result["status"], "DELIVERED");

        let raw = r#"{"id":4,"method":"sms.query","params":[{"message_id":"nope"}]}"#;
        let response = dispatch(&bridge(), parse(raw)).await;
        assert!(response.error.as_deref().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let raw = r#"{"id":5,"method":"sms.reboot","params":[]}"#;
        let response = dispatch(&bridge(), parse(raw)).await;
        assert!(response.error.as_deref().unwrap().contains("unknown method"));
    }

    #[tokio::test]
    async fn malformed_params_are_rejected() {
        let raw = r#"{"id":6,"method":"sms.submit","params":[42]}"#;
        let response = dispatch(&bridge(), parse(raw)).await;
        assert!(response.error.as_deref().unwrap().contains("invalid params"));
    }
}
