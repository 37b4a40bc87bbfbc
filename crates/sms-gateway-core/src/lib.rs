//! Core abstractions for the SMS gateway.
//!
//! This crate provides the fundamental building blocks:
//! - `Receipt`, `SubmitRequest` and friends - The gateway data model
//! - `NotificationPool` - Fan-out of delivery receipts to subscribers
//! - `SmppSession` - Trait abstracting the upstream SMPP connection
//! - `GatewayError` - The request-level error taxonomy

pub mod error;
pub mod message;
pub mod pool;
pub mod receipt;
pub mod traits;

pub use error::GatewayError;
pub use message::{Encoding, QueryRequest, QueryResult, SubmitRequest, SubmitResult};
pub use pool::{DeliverySink, NotificationPool, SubscriberId, Subscription};
pub use receipt::{DeliveryStatus, Receipt};
pub use traits::{ConnEvent, ConnState, SmppError, SmppSession};
