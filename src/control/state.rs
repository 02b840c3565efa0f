//! Remote-controlled override flags.
//!
//! Owned by [`AppService`](crate::app::service::AppService) and mutated
//! only by applying a [`ControlCommand`] on the control-loop thread.  The
//! four flags are independent: last write wins, no multi-flag transaction.

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::commands::ControlCommand;

/// Override flags consulted by the I/O transform every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    /// Swap the up/down input semantics.
    pub invert_buttons: bool,
    /// Suppress the physical-input contribution to the outputs.
    pub block_buttons: bool,
    /// Drive the up output regardless of inputs or blocking.
    pub force_up: bool,
    /// Drive the down output regardless of inputs or blocking.
    pub force_down: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the single flag a command targets.
    ///
    /// Returns `true` if the flag actually changed.
    pub fn apply(&mut self, cmd: ControlCommand) -> bool {
        let (flag, value) = match cmd {
            ControlCommand::SetInvertButtons(v) => (&mut self.invert_buttons, v),
            ControlCommand::SetBlockButtons(v) => (&mut self.block_buttons, v),
            ControlCommand::SetForceUp(v) => (&mut self.force_up, v),
            ControlCommand::SetForceDown(v) => (&mut self.force_down, v),
        };
        let changed = *flag != value;
        *flag = value;
        if changed {
            info!("CONTROL | {} = {}", cmd.field_name(), value);
        }
        changed
    }

    /// The flags as `(attribute name, value)` pairs, in subscription order.
    pub fn attributes(&self) -> [(&'static str, bool); 4] {
        [
            ("InvertButtons", self.invert_buttons),
            ("BlockButtons", self.block_buttons),
            ("ForceUp", self.force_up),
            ("ForceDown", self.force_down),
        ]
    }
}
