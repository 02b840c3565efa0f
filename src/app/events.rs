//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, mirror to a display,
//! etc.

use crate::app::commands::ControlCommand;
use crate::control::TelemetrySample;
use crate::link::LinkState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the initial link state).
    Started(LinkState),

    /// Per-tick input/output snapshot.
    Telemetry(TelemetrySample),

    /// The remote link moved between states.
    LinkChanged { from: LinkState, to: LinkState },

    /// An override flag changed value.
    ControlChanged(ControlCommand),

    /// Credentials were written to the settings store after a successful
    /// connection.
    CredentialsPersisted,

    /// The provisioning portal supplied new credentials.
    CredentialsProvisioned,
}
