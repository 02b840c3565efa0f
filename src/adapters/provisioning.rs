//! Provisioning hand-off.
//!
//! The provisioning portal runs in its own task and owns the UI.  When a
//! user submits credentials it calls [`PortalBridge::submit`]; the control
//! loop picks the latest submission up through [`ProvisioningPort`].
//! An `embassy-sync` [`Signal`] holds at most one pending value, so a
//! second submission before the loop runs simply replaces the first.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::info;

use crate::app::ports::ProvisioningPort;
use crate::error::RecordError;
use crate::settings::ConnectionConfig;

pub struct PortalBridge {
    pending: Signal<CriticalSectionRawMutex, ConnectionConfig>,
}

impl Default for PortalBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalBridge {
    pub const fn new() -> Self {
        Self {
            pending: Signal::new(),
        }
    }

    /// Validate and publish credentials from the portal.  Callable from
    /// any task.
    pub fn submit(&self, server_address: &str, auth_token: &str) -> Result<(), RecordError> {
        let config = ConnectionConfig::new(server_address, auth_token)?;
        info!("Portal: credentials submitted for '{}'", server_address);
        self.pending.signal(config);
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.signaled()
    }
}

impl ProvisioningPort for &PortalBridge {
    fn take_pending(&mut self) -> Option<ConnectionConfig> {
        self.pending.try_take()
    }
}
