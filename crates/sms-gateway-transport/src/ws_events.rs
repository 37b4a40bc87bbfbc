//! Push-style WebSocket JSON-RPC adapter: the server calls the client.
//!
//! Role reversal of [`crate::ws`]: after the upgrade this end issues a
//! `sms.deliver` call to the peer for every receipt and discards whatever
//! comes back. The inbound half of the socket carries nothing we act on, so
//! a separate reader drains it purely to notice peer closure.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use sms_gateway_bridge::RequestBridge;
use sms_gateway_core::Subscription;
use tokio::sync::oneshot;

use crate::jsonrpc::Request;
use crate::router::AppState;

/// `GET {prefix}/ws/jsonrpc/events` - upgrade and push receipts.
pub async fn ws_jsonrpc_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let subscription = state.pool.subscribe();
    let subscriber = subscription.id();
    tracing::info!(%subscriber, "event client connected");

    let (sender, receiver) = socket.split();
    pump(subscription, Arc::clone(&state.bridge), sender, receiver).await;

    tracing::info!(%subscriber, "event client disconnected");
}

/// Drive one connection: calls out for every receipt, stops on peer closure
/// or write failure. Generic over the socket halves so tests can run it on
/// plain channels.
async fn pump<Tx, Rx, E>(
    mut subscription: Subscription,
    bridge: Arc<RequestBridge>,
    mut sender: Tx,
    receiver: Rx,
) where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Send + 'static,
{
    let subscriber = subscription.id();

    // Watch the inbound half only for closure; responses to our calls are
    // discarded along the way.
    let (closed_tx, mut closed_rx) = oneshot::channel::<()>();
    let reader = tokio::spawn(async move {
        let mut receiver = receiver;
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });

    let mut next_id: u64 = 0;
    loop {
        tokio::select! {
            maybe = subscription.next() => {
                let Some(receipt) = maybe else { break };
                let call = bridge.deliver(receipt);
                next_id += 1;
                let request = match Request::call(call.method, &call.receipt, next_id) {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::error!(%subscriber, "failed to encode deliver call: {e}");
                        continue;
                    }
                };
                let Ok(json) = serde_json::to_string(&request) else { continue };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    // Peer is gone; the subscription drop below unregisters.
                    break;
                }
            }
            _ = &mut closed_rx => break,
        }
    }

    reader.abort();
}
