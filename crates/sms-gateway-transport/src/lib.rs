//! Client-facing transport adapters for the SMS gateway.
//!
//! Provides:
//! - HTTP submit/query endpoints (multipart form in, JSON out)
//! - SSE stream of delivery receipts
//! - WebSocket JSON-RPC in both directions (client-calls-server and
//!   server-calls-client)
//! - [`ApiHandler`] - mounts all endpoints on an externally owned router

pub mod http;
pub mod jsonrpc;
pub mod router;
pub mod sse;
pub mod ws;
pub mod ws_events;

pub use router::{ApiHandler, AppState};
