//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the control state, the remote link state machine
//! and the candidate credentials.  It exposes a clean, hardware-agnostic
//! API.  All I/O flows through port traits injected at call sites, making
//! the entire service testable with mock adapters.
//!
//! ```text
//!     InputPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                   │       AppService        │
//!    OutputPort ◀── │ Control · Link · RPC    │ ◀─▶ EndpointPort
//!                   └────────────────────────┘ ──▶ SettingsPort
//! ```

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::{transform, ControlState, OutputFrame, TelemetrySample};
use crate::link::{LinkState, RemoteLink, Transition};
use crate::settings::{ConnectionConfig, MaskedToken};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EndpointPort, EventSink, InputPort, OutputPort, SettingsPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    control: ControlState,
    link: RemoteLink,
    /// Credentials used for the next connect attempt.
    candidate: ConnectionConfig,
    tick_count: u64,
}

impl AppService {
    /// Construct the service.
    ///
    /// `stored` is whatever the settings store yielded at boot; an empty
    /// config leaves the link waiting for provisioning.  Does **not** emit
    /// anything — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, stored: ConnectionConfig) -> Self {
        let mut link = RemoteLink::new(config.reconnect_backoff_ms);
        if stored.is_complete() {
            link = link.with_persisted(stored.clone());
        }
        Self {
            config,
            control: ControlState::new(),
            link,
            candidate: stored,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.link.state()));
        info!(
            "AppService started in {:?} (server '{}', token {})",
            self.link.state(),
            self.candidate.server_address(),
            MaskedToken(self.candidate.auth_token())
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle:
    /// inputs → transform → outputs → telemetry → link → events → RPC.
    ///
    /// The `hw` parameter satisfies **both** [`InputPort`] and
    /// [`OutputPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl InputPort + OutputPort),
        endpoint: &mut impl EndpointPort,
        settings: &impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Sample inputs
        let raw = hw.read_inputs();

        // 2. Pure transform
        let frame = transform(raw, &self.control);

        // 3. Drive outputs
        apply_outputs(hw, &frame);

        // 4. Telemetry (best effort)
        let sample = TelemetrySample::new(raw, frame);
        if self.link.state().is_connected() {
            for (name, value) in sample.fields() {
                if let Err(e) = endpoint.send_telemetry_bool(name, value) {
                    debug!("telemetry {} dropped: {}", name, e);
                }
            }
        }

        // 5. Remote link
        let report = self.link.tick(now_ms, endpoint, &self.candidate, settings);
        if report.transition.is_some_and(|t| t.to == LinkState::Subscribed) {
            self.publish_attributes(endpoint);
        }

        // 6. Events for the I/O and link steps
        sink.emit(&AppEvent::Telemetry(sample));
        if let Some(Transition { from, to }) = report.transition {
            sink.emit(&AppEvent::LinkChanged { from, to });
        }
        if report.persisted {
            sink.emit(&AppEvent::CredentialsPersisted);
        }

        // 7. Pending remote commands, one event per applied command
        while let Some(req) = endpoint.next_request() {
            let Some(cmd) = self.link.dispatch(&req, &mut self.control) else {
                debug!("RPC {} '{}' not routed", req.request_id, req.method);
                continue;
            };
            if let Err(e) = endpoint.acknowledge(req.request_id) {
                warn!("RPC {} ack failed: {}", req.request_id, e);
            }
            self.publish_attributes(endpoint);
            sink.emit(&AppEvent::ControlChanged(cmd));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a locally originated command (provisioning portal, console).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        endpoint: &mut impl EndpointPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Provision(config) => {
                if !config.is_complete() {
                    warn!("Provisioning ignored: incomplete credentials");
                    return;
                }
                info!(
                    "Provisioned server '{}' token {}; used for the next connect",
                    config.server_address(),
                    MaskedToken(config.auth_token())
                );
                self.candidate = config;
                sink.emit(&AppEvent::CredentialsProvisioned);
            }
            AppCommand::Control(cmd) => {
                self.control.apply(cmd);
                if self.link.state().is_subscribed() {
                    self.publish_attributes(endpoint);
                }
                sink.emit(&AppEvent::ControlChanged(cmd));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn control_state(&self) -> ControlState {
        self.control
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Credentials the link will use for its next attempt.
    pub fn candidate(&self) -> &ConnectionConfig {
        &self.candidate
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn publish_attributes(&self, endpoint: &mut impl EndpointPort) {
        if !self.config.publish_attributes {
            return;
        }
        for (name, value) in self.control.attributes() {
            if let Err(e) = endpoint.send_attribute_bool(name, value) {
                debug!("attribute {} dropped: {}", name, e);
            }
        }
    }
}

fn apply_outputs(hw: &mut impl OutputPort, frame: &OutputFrame) {
    hw.set_output_up(frame.output_up);
    hw.set_output_down(frame.output_down);
    hw.set_indicator(frame.indicator_idle);
}
