//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "ON" } else { "off" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            // Every tick; too chatty for info.
            AppEvent::Telemetry(t) => {
                debug!(
                    "TELEM | in up={} down={} | out up={} down={}",
                    on_off(t.input_up),
                    on_off(t.input_down),
                    on_off(t.output_up),
                    on_off(t.output_down),
                );
            }
            AppEvent::LinkChanged { from, to } => {
                info!("LINK  | {:?} -> {:?}", from, to);
            }
            AppEvent::ControlChanged(cmd) => {
                info!(
                    "CTRL  | {} -> {} = {}",
                    cmd.method_name(),
                    cmd.field_name(),
                    cmd.value()
                );
            }
            AppEvent::CredentialsPersisted => {
                info!("CREDS | persisted");
            }
            AppEvent::CredentialsProvisioned => {
                info!("CREDS | provisioned, pending next connect");
            }
            AppEvent::Started(state) => {
                info!("START | link={:?}", state);
            }
        }
    }
}
