//! Validation and upstream forwarding for submit/query requests.

use std::sync::Arc;

use sms_gateway_core::{
    GatewayError, QueryRequest, QueryResult, Receipt, SmppSession, SubmitRequest, SubmitResult,
};

/// Fixed procedure name the push adapter invokes on event clients.
pub const DELIVER_METHOD: &str = "sms.deliver";

/// An outbound remote call carrying one receipt to a connected client.
///
/// Fire-and-forget: the adapter that encodes and writes it owns any
/// transport failure, and nothing flows back to the upstream session.
#[derive(Debug, Clone)]
pub struct DeliverCall {
    /// Procedure name to invoke on the client.
    pub method: &'static str,
    /// Receipt passed as the call argument.
    pub receipt: Receipt,
}

/// Translates structured requests into upstream session calls.
pub struct RequestBridge {
    session: Arc<dyn SmppSession>,
}

impl RequestBridge {
    /// Build a bridge over the given upstream session.
    #[must_use]
    pub fn new(session: Arc<dyn SmppSession>) -> Self {
        Self { session }
    }

    /// Submit an outbound message.
    ///
    /// Required fields are checked before the upstream is contacted; a
    /// validation failure therefore costs nothing on the wire.
    ///
    /// # Errors
    /// [`GatewayError::Validation`] for missing fields,
    /// [`GatewayError::Upstream`] when the session rejects or fails the
    /// submit (transient/permanent preserved from the session's report).
    pub async fn submit(&self, req: &SubmitRequest) -> Result<SubmitResult, GatewayError> {
        for (name, value) in [("to", &req.to), ("from", &req.from), ("text", &req.text)] {
            if value.is_empty() {
                return Err(GatewayError::missing_field(name));
            }
        }

        let message_id = self.session.submit(req).await.map_err(|e| {
            tracing::warn!(to = %req.to, error = %e, "upstream rejected submit");
            GatewayError::from(e)
        })?;

        tracing::info!(%message_id, to = %req.to, "message submitted");
        Ok(SubmitResult { message_id })
    }

    /// Look up the delivery status of a message.
    ///
    /// # Errors
    /// [`GatewayError::Validation`] when the identifier is missing,
    /// [`GatewayError::NotFound`] when the upstream does not know it,
    /// [`GatewayError::Upstream`] for other upstream failures.
    pub async fn query(&self, req: &QueryRequest) -> Result<QueryResult, GatewayError> {
        if req.message_id.is_empty() {
            return Err(GatewayError::missing_field("message_id"));
        }

        let status = self.session.query(&req.message_id).await?;
        Ok(QueryResult { status })
    }

    /// Wrap a receipt as the outbound call the push adapter issues to its
    /// connected client.
    #[must_use]
    pub fn deliver(&self, receipt: Receipt) -> DeliverCall {
        DeliverCall {
            method: DELIVER_METHOD,
            receipt,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sms_gateway_core::{ConnEvent, DeliveryStatus, SmppError};
    use tokio::sync::mpsc;

    use super::*;

    /// Test double that records submits and answers from a script.
    #[derive(Default)]
    struct RecordingSession {
        submits: Mutex<Vec<SubmitRequest>>,
        submit_response: Option<Result<String, SmppError>>,
        query_response: Option<Result<DeliveryStatus, SmppError>>,
    }

    #[async_trait]
    impl SmppSession for RecordingSession {
        fn bind(&self) -> mpsc::Receiver<ConnEvent> {
            let (_tx, rx) = mpsc::channel(1);
            rx
        }

        async fn submit(&self, req: &SubmitRequest) -> Result<String, SmppError> {
            self.submits.lock().unwrap().push(req.clone());
            self.submit_response
                .clone()
                .unwrap_or(Ok("stub-id".to_string()))
        }

        async fn query(&self, message_id: &str) -> Result<DeliveryStatus, SmppError> {
            self.query_response
                .clone()
                .unwrap_or(Err(SmppError::NotFound(message_id.to_string())))
        }
    }

    fn submit_req(to: &str, from: &str, text: &str) -> SubmitRequest {
        SubmitRequest {
            to: to.into(),
            from: from.into(),
            text: text.into(),
            encoding: None,
            register: false,
        }
    }

    #[tokio::test]
    async fn empty_fields_never_reach_upstream() {
        let session = Arc::new(RecordingSession::default());
        let bridge = RequestBridge::new(Arc::clone(&session) as Arc<dyn SmppSession>);

        for req in [
            submit_req("", "x", "y"),
            submit_req("123", "", "y"),
            submit_req("123", "x", ""),
        ] {
            let err = bridge.submit(&req).await.unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)));
        }

        assert!(session.submits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_returns_upstream_id() {
        let session = Arc::new(RecordingSession {
            submit_response: Some(Ok("abc".to_string())),
            ..Default::default()
        });
        let bridge = RequestBridge::new(Arc::clone(&session) as Arc<dyn SmppSession>);

        let result = bridge.submit(&submit_req("123", "x", "y")).await.unwrap();
        assert_eq!(result, SubmitResult { message_id: "abc".into() });
        assert_eq!(session.submits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_rejection_keeps_transience() {
        let session = Arc::new(RecordingSession {
            submit_response: Some(Err(SmppError::NotConnected)),
            ..Default::default()
        });
        let bridge = RequestBridge::new(session as Arc<dyn SmppSession>);

        let err = bridge.submit(&submit_req("123", "x", "y")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { transient: true, .. }));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_not_upstream() {
        let session = Arc::new(RecordingSession {
            query_response: Some(Err(SmppError::NotFound("m9".to_string()))),
            ..Default::default()
        });
        let bridge = RequestBridge::new(session as Arc<dyn SmppSession>);

        let req = QueryRequest { message_id: "m9".into() };
        assert!(matches!(
            bridge.query(&req).await.unwrap_err(),
            GatewayError::NotFound(_)
        ));

        let session = Arc::new(RecordingSession {
            query_response: Some(Err(SmppError::Timeout)),
            ..Default::default()
        });
        let bridge = RequestBridge::new(session as Arc<dyn SmppSession>);
        assert!(matches!(
            bridge.query(&req).await.unwrap_err(),
            GatewayError::Upstream { .. }
        ));
    }

    #[tokio::test]
    async fn query_success_maps_status() {
        let session = Arc::new(RecordingSession {
            query_response: Some(Ok(DeliveryStatus::Delivered)),
            ..Default::default()
        });
        let bridge = RequestBridge::new(session as Arc<dyn SmppSession>);

        let req = QueryRequest { message_id: "m1".into() };
        let result = bridge.query(&req).await.unwrap();
        assert_eq!(result.status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn empty_query_id_is_validation() {
        let session = Arc::new(RecordingSession::default());
        let bridge = RequestBridge::new(session as Arc<dyn SmppSession>);

        let req = QueryRequest { message_id: String::new() };
        assert!(matches!(
            bridge.query(&req).await.unwrap_err(),
            GatewayError::Validation(_)
        ));
    }

    #[test]
    fn deliver_uses_fixed_method_name() {
        let session = Arc::new(RecordingSession::default());
        let bridge = RequestBridge::new(session as Arc<dyn SmppSession>);

        let call = bridge.deliver(Receipt::new("m1", DeliveryStatus::Delivered, ""));
        assert_eq!(call.method, DELIVER_METHOD);
        assert_eq!(call.receipt.message_id, "m1");
    }
}
