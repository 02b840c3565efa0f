//! Remote link state machine.
//!
//! ```text
//!               ┌──────────────[timer not elapsed / no config]─────────┐
//!               ▼                                                      │
//!  DISCONNECTED ──▶ CONNECT_PENDING ──[attempt ok]──▶ CONNECTED ──[subscribe ok]──▶ SUBSCRIBED
//!       ▲   │              │                              │                          │
//!       │   └─[attempt]────┤                              └────────[liveness lost]───┤
//!       └──[attempt fails]─┘                                                         │
//!       └────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`RemoteLink::tick`] makes at most one transition per call.  Time is
//! injected as `now_ms`; nothing here reads a clock.  Every connect
//! attempt and every session loss re-arms the retry timer one backoff
//! interval ahead, so an unreachable endpoint is tried at most once per
//! backoff.  The very first attempt is unthrottled.

use log::{info, warn};

use crate::app::commands::ControlCommand;
use crate::app::ports::{EndpointPort, SettingsPort};
use crate::control::ControlState;
use crate::rpc::{self, RpcRequest};
use crate::settings::{ConnectionConfig, MaskedToken};

/// Observable link states.
///
/// `Subscribed` implies connected; there is no way to represent a
/// subscription without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    /// Waiting for the retry timer or for complete credentials.
    ConnectPending,
    /// Session open, RPC subscription not yet confirmed.
    Connected,
    /// Session open and RPC methods subscribed.
    Subscribed,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::Subscribed)
    }

    pub fn is_subscribed(self) -> bool {
        self == Self::Subscribed
    }
}

/// A single state change produced by [`RemoteLink::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LinkState,
    pub to: LinkState,
}

/// What happened during one [`RemoteLink::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub transition: Option<Transition>,
    /// The credentials used for a successful connect were written to the
    /// settings store.
    pub persisted: bool,
}

pub struct RemoteLink {
    state: LinkState,
    next_retry_at_ms: u64,
    backoff_ms: u64,
    connect_attempts: u32,
    /// Last record known to be in the settings store.
    last_persisted: Option<ConnectionConfig>,
}

impl RemoteLink {
    pub fn new(backoff_ms: u32) -> Self {
        Self {
            state: LinkState::Disconnected,
            next_retry_at_ms: 0,
            backoff_ms: u64::from(backoff_ms),
            connect_attempts: 0,
            last_persisted: None,
        }
    }

    /// Record what the settings store already holds, so a reconnect with
    /// unchanged credentials does not rewrite flash.
    pub fn with_persisted(mut self, stored: ConnectionConfig) -> Self {
        self.last_persisted = Some(stored);
        self
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn next_retry_at_ms(&self) -> u64 {
        self.next_retry_at_ms
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    /// Advance the state machine by at most one transition.
    pub fn tick(
        &mut self,
        now_ms: u64,
        endpoint: &mut impl EndpointPort,
        candidate: &ConnectionConfig,
        settings: &impl SettingsPort,
    ) -> TickReport {
        let from = self.state;
        let mut report = TickReport::default();

        let to = match from {
            LinkState::Disconnected | LinkState::ConnectPending => {
                if now_ms >= self.next_retry_at_ms && candidate.is_complete() {
                    if self.attempt(now_ms, endpoint, candidate) {
                        report.persisted = self.persist(candidate, settings);
                        LinkState::Connected
                    } else {
                        LinkState::Disconnected
                    }
                } else {
                    LinkState::ConnectPending
                }
            }
            LinkState::Connected | LinkState::Subscribed if !endpoint.is_connected() => {
                self.next_retry_at_ms = now_ms.saturating_add(self.backoff_ms);
                warn!(
                    "LINK | session lost, next attempt at {} ms",
                    self.next_retry_at_ms
                );
                LinkState::Disconnected
            }
            LinkState::Connected => {
                info!("LINK | subscribing for RPC");
                match endpoint.subscribe_rpc(&ControlCommand::METHODS) {
                    Ok(()) => LinkState::Subscribed,
                    Err(e) => {
                        warn!("LINK | {}, retrying next tick", e);
                        LinkState::Connected
                    }
                }
            }
            LinkState::Subscribed => LinkState::Subscribed,
        };

        if to != from {
            info!("LINK | {:?} -> {:?}", from, to);
            self.state = to;
            report.transition = Some(Transition { from, to });
        }
        report
    }

    /// Route one request.  Only a subscribed link routes; anything else,
    /// and any method outside the subscription list, is a no-op.
    ///
    /// Returns the command that was applied.
    pub fn dispatch(&self, req: &RpcRequest, control: &mut ControlState) -> Option<ControlCommand> {
        if !self.state.is_subscribed() {
            return None;
        }
        let cmd = rpc::decode(req)?;
        control.apply(cmd);
        Some(cmd)
    }

    fn attempt(
        &mut self,
        now_ms: u64,
        endpoint: &mut impl EndpointPort,
        candidate: &ConnectionConfig,
    ) -> bool {
        self.next_retry_at_ms = now_ms.saturating_add(self.backoff_ms);
        self.connect_attempts = self.connect_attempts.wrapping_add(1);
        info!(
            "LINK | connecting to {} with token {}",
            candidate.server_address(),
            MaskedToken(candidate.auth_token())
        );
        match endpoint.connect(candidate.server_address(), candidate.auth_token()) {
            Ok(()) => true,
            Err(e) => {
                warn!("LINK | {}", e);
                false
            }
        }
    }

    fn persist(&mut self, config: &ConnectionConfig, settings: &impl SettingsPort) -> bool {
        if self.last_persisted.as_ref() == Some(config) {
            return false;
        }
        match settings.save(config) {
            Ok(()) => {
                info!("LINK | credentials saved");
                self.last_persisted = Some(config.clone());
                true
            }
            Err(e) => {
                warn!("LINK | credential save failed: {}", e);
                false
            }
        }
    }
}
