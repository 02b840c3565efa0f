//! Request → [`ControlCommand`] decoding.
//!
//! Each handler reads one named boolean from the params object.  Values
//! are coerced, not validated:
//!
//! | params                    | value             |
//! |---------------------------|-------------------|
//! | `{"ForceUp": true}`       | `true`            |
//! | `{"ForceUp": 1}` / `0`    | non-zero → `true` |
//! | `true` (bare boolean)     | `true`            |
//! | missing / null / other    | `false` (warned)  |

use log::warn;
use serde_json::Value;

use super::RpcRequest;
use crate::app::commands::ControlCommand;

/// Decode a request.  `None` for methods outside the subscription list.
pub fn decode(req: &RpcRequest) -> Option<ControlCommand> {
    let field = ControlCommand::from_method(&req.method, false)?.field_name();
    let value = coerce_field(&req.params, field);
    ControlCommand::from_method(&req.method, value)
}

fn coerce_field(params: &[u8], field: &str) -> bool {
    let parsed: Value = match serde_json::from_slice(params) {
        Ok(v) => v,
        Err(e) => {
            warn!("RPC: params for '{}' not JSON ({}), using false", field, e);
            return false;
        }
    };

    match parsed {
        Value::Bool(b) => b,
        Value::Object(map) => match map.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => {
                warn!("RPC: '{}' is numeric ({}), coercing", field, n);
                n.as_f64().is_some_and(|f| f != 0.0)
            }
            Some(other) => {
                warn!("RPC: '{}' has non-boolean value {}, using false", field, other);
                false
            }
            None => {
                warn!("RPC: '{}' missing from params, using false", field);
                false
            }
        },
        other => {
            warn!("RPC: unexpected params {} for '{}', using false", other, field);
            false
        }
    }
}
