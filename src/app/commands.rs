//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (remote RPC,
//! provisioning portal) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::settings::ConnectionConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// New endpoint credentials from the provisioning portal.  Used for
    /// the next connection attempt; persisted only once it succeeds.
    Provision(ConnectionConfig),

    /// Set one override flag.
    Control(ControlCommand),
}

/// The closed set of remote commands.
///
/// Adding a variant forces a new arm in every exhaustive `match` —
/// [`ControlState::apply`](crate::control::ControlState::apply), the name
/// tables below — so a command without a handler cannot compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    SetInvertButtons(bool),
    SetBlockButtons(bool),
    SetForceUp(bool),
    SetForceDown(bool),
}

impl ControlCommand {
    /// RPC method names the device subscribes to.
    pub const METHODS: [&'static str; 4] = [
        "set_InvertButtons",
        "set_BlockButtons",
        "set_ForceUp",
        "set_ForceDown",
    ];

    /// Build the command named by `method`, or `None` if the name is not
    /// one of [`Self::METHODS`].
    pub fn from_method(method: &str, value: bool) -> Option<Self> {
        match method {
            "set_InvertButtons" => Some(Self::SetInvertButtons(value)),
            "set_BlockButtons" => Some(Self::SetBlockButtons(value)),
            "set_ForceUp" => Some(Self::SetForceUp(value)),
            "set_ForceDown" => Some(Self::SetForceDown(value)),
            _ => None,
        }
    }

    /// The RPC method that carries this command.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::SetInvertButtons(_) => "set_InvertButtons",
            Self::SetBlockButtons(_) => "set_BlockButtons",
            Self::SetForceUp(_) => "set_ForceUp",
            Self::SetForceDown(_) => "set_ForceDown",
        }
    }

    /// Payload key holding the boolean; also the attribute name.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::SetInvertButtons(_) => "InvertButtons",
            Self::SetBlockButtons(_) => "BlockButtons",
            Self::SetForceUp(_) => "ForceUp",
            Self::SetForceDown(_) => "ForceDown",
        }
    }

    pub fn value(self) -> bool {
        match self {
            Self::SetInvertButtons(v)
            | Self::SetBlockButtons(v)
            | Self::SetForceUp(v)
            | Self::SetForceDown(v) => v,
        }
    }
}
