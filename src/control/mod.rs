//! Local control core: the override flags and the per-tick I/O transform.
//!
//! ```text
//!  raw inputs ──▶ transform(ControlState) ──▶ relay outputs + status LED
//! ```
//!
//! Nothing here performs I/O; the service reads pins through ports and
//! hands the values in.

pub mod state;
pub mod transform;

pub use state::ControlState;
pub use transform::{transform, OutputFrame, RawInputs, TelemetrySample};
