//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (pins, endpoint client, settings store, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use crate::control::RawInputs;
use crate::error::{ConfigError, EndpointError};
use crate::rpc::RpcRequest;
use crate::settings::ConnectionConfig;

// ───────────────────────────────────────────────────────────────
// Input / output ports (driven adapter: domain ↔ GPIO)
// ───────────────────────────────────────────────────────────────

/// Read-side port: sampled once per control tick.
pub trait InputPort {
    fn read_inputs(&mut self) -> RawInputs;
}

/// Write-side port: driven once per control tick.
pub trait OutputPort {
    fn set_output_up(&mut self, active: bool);

    fn set_output_down(&mut self, active: bool);

    /// Status LED; `idle` is true while no button is held.
    fn set_indicator(&mut self, idle: bool);
}

// ───────────────────────────────────────────────────────────────
// Endpoint port (driven adapter: domain ↔ telemetry/command service)
// ───────────────────────────────────────────────────────────────

/// Session with the remote telemetry/command service.
///
/// Every call must return within a bounded time; a slow call stretches
/// the control loop period.
pub trait EndpointPort {
    /// Open a session.  Replaces any previous session.
    fn connect(&mut self, server_address: &str, auth_token: &str) -> Result<(), EndpointError>;

    /// Liveness check.
    fn is_connected(&self) -> bool;

    fn send_telemetry_bool(&mut self, name: &str, value: bool) -> Result<(), EndpointError>;

    fn send_attribute_bool(&mut self, name: &str, value: bool) -> Result<(), EndpointError>;

    /// Subscribe to the given RPC method names.
    fn subscribe_rpc(&mut self, methods: &[&str]) -> Result<(), EndpointError>;

    /// Next queued inbound request, if any.
    fn next_request(&mut self) -> Option<RpcRequest>;

    /// Send the (empty) acknowledgement for a handled request.
    fn acknowledge(&mut self, request_id: u32) -> Result<(), EndpointError>;
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ non-volatile storage)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the endpoint credentials record.
pub trait SettingsPort {
    /// Returns [`ConfigError::NotFound`] on first boot and
    /// [`ConfigError::Corrupted`] if the record does not decode.
    fn load(&self) -> Result<ConnectionConfig, ConfigError>;

    /// Overwrite the stored record.
    fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Provisioning port (driving adapter: portal → domain)
// ───────────────────────────────────────────────────────────────

/// Hand-off point for credentials entered in the provisioning portal.
pub trait ProvisioningPort {
    /// Take the most recently submitted credentials, if any.
    fn take_pending(&mut self) -> Option<ConnectionConfig>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
