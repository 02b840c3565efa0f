//! Bounded hand-off queue between the network task and the control loop.
//!
//! Uses an `embassy-sync` channel so the MQTT event callback (another
//! ESP-IDF task) can enqueue without blocking and without heap
//! allocation.  The control loop is the only consumer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::RpcRequest;

/// Channel depth for inbound requests.
pub const INBOX_DEPTH: usize = 8;

pub struct RpcInbox {
    channel: Channel<CriticalSectionRawMutex, RpcRequest, INBOX_DEPTH>,
}

impl Default for RpcInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcInbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue from any context.  Returns `false` (request dropped) when full.
    pub fn push(&self, req: RpcRequest) -> bool {
        match self.channel.try_send(req) {
            Ok(()) => true,
            Err(_) => {
                warn!("RPC inbox full, request dropped");
                false
            }
        }
    }

    /// Dequeue the oldest request.
    pub fn pop(&self) -> Option<RpcRequest> {
        self.channel.try_receive().ok()
    }

    /// Discard everything queued (e.g. on session loss).
    pub fn clear(&self) {
        self.channel.clear();
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
