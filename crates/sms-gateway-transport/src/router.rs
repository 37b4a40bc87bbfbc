//! Endpoint registration onto an externally owned router.

use std::sync::Arc;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use sms_gateway_bridge::RequestBridge;
use sms_gateway_core::{ConnEvent, DeliverySink, NotificationPool, SmppSession};
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};

use crate::{http, sse, ws, ws_events};

/// State shared by every endpoint handler.
#[derive(Clone)]
pub struct AppState {
    /// Receipt fan-out registry.
    pub pool: Arc<NotificationPool>,
    /// Submit/query bridge to the upstream session.
    pub bridge: Arc<RequestBridge>,
}

/// Wires the gateway endpoints onto a router supplied by the bootstrap
/// layer.
///
/// Construction order matters: the bootstrap builds the handler first, takes
/// its [`DeliverySink`] to construct the upstream session with, then calls
/// [`ApiHandler::register`] with that session. The sink is the session's one
/// and only receipt listener.
pub struct ApiHandler {
    prefix: String,
    version: String,
    pool: Arc<NotificationPool>,
}

impl Default for ApiHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiHandler {
    /// Create a handler with an empty prefix and version tag `v1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            version: "v1".to_string(),
            pool: Arc::new(NotificationPool::new()),
        }
    }

    /// Set the path prefix preceding the version segment.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the version segment.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The capability handed to the upstream session at construction: on
    /// every inbound receipt it fans out to all registered subscribers.
    #[must_use]
    pub fn delivery_sink(&self) -> DeliverySink {
        DeliverySink::new(Arc::clone(&self.pool))
    }

    /// Root path of all endpoints, e.g. `/v1` or `/api/v1`.
    #[must_use]
    pub fn url_prefix(&self) -> String {
        let mut path = String::new();
        for segment in [self.prefix.as_str(), self.version.as_str()] {
            let trimmed = segment.trim_matches('/');
            if !trimmed.is_empty() {
                path.push('/');
                path.push_str(trimmed);
            }
        }
        if path.is_empty() { "/v1".to_string() } else { path }
    }

    /// Mount all endpoints under the url prefix and bind the upstream
    /// session, returning the augmented router and the session's
    /// connection-status stream for the bootstrap layer to log.
    ///
    /// Must be called once, before the server starts.
    #[must_use]
    pub fn register(
        self,
        router: Router,
        session: Arc<dyn SmppSession>,
    ) -> (Router, ReceiverStream<ConnEvent>) {
        let status = ReceiverStream::new(session.bind());
        let prefix = self.url_prefix();

        let state = AppState {
            pool: self.pool,
            bridge: Arc::new(RequestBridge::new(session)),
        };

        // Each route carries its own CORS layer so preflights enumerate
        // exactly the methods that route accepts.
        let api = Router::new()
            .merge(
                Router::new()
                    .route("/send", post(http::send).put(http::send))
                    .layer(cors(&[Method::POST, Method::PUT])),
            )
            .merge(
                Router::new()
                    .route("/query", get(http::query))
                    .layer(cors(&[Method::GET, Method::HEAD])),
            )
            .merge(
                Router::new()
                    .route("/sse", get(sse::sse))
                    .layer(cors(&[Method::GET])),
            )
            .merge(
                Router::new()
                    .route("/ws/jsonrpc", get(ws::ws_jsonrpc))
                    .layer(cors(&[Method::GET])),
            )
            .merge(
                Router::new()
                    .route("/ws/jsonrpc/events", get(ws_events::ws_jsonrpc_events))
                    .layer(cors(&[Method::GET])),
            )
            .with_state(state);

        (router.nest(&prefix, api), status)
    }
}

fn cors(methods: &[Method]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(methods.to_vec())
}
