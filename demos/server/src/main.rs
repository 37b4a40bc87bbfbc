//! Demo gateway server backed by a loopback upstream session.
//!
//! Run with: cargo run -p sms-gateway-server
//!
//! Every submitted message is acknowledged immediately and a synthetic
//! DELIVERED receipt is fanned out to subscribers half a second later, so
//! the SSE and event-socket endpoints have something to show without a real
//! SMSC behind them.
//!
//! Environment:
//! - `SMS_GATEWAY_ADDR` - listen address (default `127.0.0.1:8080`)
//! - `SMS_GATEWAY_PREFIX` - path prefix before the version segment
//! - `SMS_GATEWAY_VERSION` - version segment (default `v1`)

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;
use futures::StreamExt;
use sms_gateway_core::{
    ConnEvent, ConnState, DeliverySink, DeliveryStatus, Receipt, SmppError, SmppSession,
    SubmitRequest,
};
use sms_gateway_transport::ApiHandler;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upstream stand-in: answers submits locally and synthesizes receipts.
struct LoopbackSession {
    sink: DeliverySink,
    statuses: Arc<Mutex<HashMap<String, DeliveryStatus>>>,
    next_id: AtomicU64,
}

impl LoopbackSession {
    fn new(sink: DeliverySink) -> Self {
        Self {
            sink,
            statuses: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl SmppSession for LoopbackSession {
    fn bind(&self) -> mpsc::Receiver<ConnEvent> {
        let (tx, rx) = mpsc::channel(4);
        let _ = tx.try_send(ConnEvent {
            status: ConnState::Connected,
            error: None,
        });
        rx
    }

    async fn submit(&self, req: &SubmitRequest) -> Result<String, SmppError> {
        let message_id = format!("{:08x}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.statuses
            .lock()
            .unwrap()
            .insert(message_id.clone(), DeliveryStatus::Enroute);

        if req.register {
            let sink = self.sink.clone();
            let statuses = Arc::clone(&self.statuses);
            let id = message_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                statuses.lock().unwrap().insert(id.clone(), DeliveryStatus::Delivered);
                let raw = format!("id:{id} stat:DELIVRD");
                sink.deliver(&Receipt::new(id, DeliveryStatus::Delivered, raw));
            });
        }

        Ok(message_id)
    }

    async fn query(&self, message_id: &str) -> Result<DeliveryStatus, SmppError> {
        self.statuses
            .lock()
            .unwrap()
            .get(message_id)
            .copied()
            .ok_or_else(|| SmppError::NotFound(message_id.to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr: SocketAddr = std::env::var("SMS_GATEWAY_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;
    let prefix = std::env::var("SMS_GATEWAY_PREFIX").unwrap_or_default();
    let version = std::env::var("SMS_GATEWAY_VERSION").unwrap_or_else(|_| "v1".to_string());

    let handler = ApiHandler::new().with_prefix(prefix).with_version(version);
    let root = handler.url_prefix();

    let session = Arc::new(LoopbackSession::new(handler.delivery_sink()));
    let (router, mut status) = handler.register(Router::new(), session);

    tokio::spawn(async move {
        while let Some(event) = status.next().await {
            match event.error {
                Some(err) => tracing::warn!(status = ?event.status, %err, "upstream connection"),
                None => tracing::info!(status = ?event.status, "upstream connection"),
            }
        }
    });

    let app = router.layer(TraceLayer::new_for_http());

    tracing::info!("gateway listening on http://{addr}{root}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
        return;
    }
    tracing::info!("shutting down");
}
