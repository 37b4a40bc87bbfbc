//! Request bridge between client transports and the upstream SMPP session.
//!
//! Transport adapters hand decoded requests to [`RequestBridge`]; it
//! validates them, forwards to the upstream session, and classifies the
//! outcome. It holds no mutable state, so one instance serves every
//! connection concurrently.

pub mod bridge;

pub use bridge::{DELIVER_METHOD, DeliverCall, RequestBridge};
