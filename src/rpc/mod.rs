//! Remote command (RPC) subsystem.
//!
//! ```text
//! ┌──────────────┐  RpcRequest  ┌──────────┐  RpcRequest  ┌──────────────┐
//! │ MQTT callback │────────────▶│ RpcInbox │────────────▶│ Control loop │
//! │ (net task)    │  try_send   │ (bounded)│  try_receive │  decode +    │
//! └──────────────┘              └──────────┘              │  apply       │
//!                                                          └──────────────┘
//! ```
//!
//! Requests are only decoded and applied on the control-loop thread, so
//! [`ControlState`](crate::control::ControlState) never needs a lock.

pub mod decode;
pub mod inbox;

pub use decode::decode;
pub use inbox::RpcInbox;

use std::borrow::Cow;

use heapless::{String, Vec};
use log::warn;
use serde::Deserialize;

/// Longest method name kept; anything longer cannot be one of ours.
pub const METHOD_CAPACITY: usize = 32;
/// Serialized `params` bytes kept per request.
pub const PARAMS_CAPACITY: usize = 128;

/// Topic prefix the endpoint publishes RPC requests under.
pub const REQUEST_TOPIC_PREFIX: &str = "v1/devices/me/rpc/request/";

/// One inbound remote command, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub request_id: u32,
    pub method: String<METHOD_CAPACITY>,
    /// JSON-encoded `params` value.
    pub params: Vec<u8, PARAMS_CAPACITY>,
}

#[derive(Deserialize)]
struct Envelope<'a> {
    /// Borrowed unless the JSON string carries escapes.
    #[serde(borrow)]
    method: Cow<'a, str>,
    #[serde(default)]
    params: serde_json::Value,
}

impl RpcRequest {
    /// Build a request; `None` if the method or params exceed capacity.
    pub fn new(request_id: u32, method: &str, params: &[u8]) -> Option<Self> {
        let mut m = String::new();
        m.push_str(method).ok()?;
        let p = Vec::from_slice(params).ok()?;
        Some(Self {
            request_id,
            method: m,
            params: p,
        })
    }

    /// Parse a ThingsBoard request: topic `v1/devices/me/rpc/request/{id}`,
    /// body `{"method": "...", "params": ...}`.
    pub fn from_message(topic: &str, body: &[u8]) -> Option<Self> {
        let request_id = topic.strip_prefix(REQUEST_TOPIC_PREFIX)?.parse().ok()?;
        let envelope: Envelope<'_> = match serde_json::from_slice(body) {
            Ok(e) => e,
            Err(e) => {
                warn!("RPC: undecodable request {} ({})", request_id, e);
                return None;
            }
        };
        let params = serde_json::to_vec(&envelope.params).ok()?;
        let req = Self::new(request_id, &envelope.method, &params);
        if req.is_none() {
            warn!(
                "RPC: request {} '{}' exceeds buffer, dropped",
                request_id, envelope.method
            );
        }
        req
    }
}
