//! Combinational input → output policy.
//!
//! ```text
//!  up'   = invert ? down : up
//!  down' = invert ? up   : down
//!  out_up   = (up'   && !block) || force_up
//!  out_down = (down' && !block) || force_down
//!  idle     = !up' && !down'
//! ```
//!
//! Forcing always wins over blocking.  The idle signal is symmetric in the
//! two readings, so it is the same before and after the swap; it is
//! computed from the swapped pair and that symmetry must be kept.

use super::ControlState;

/// Raw digital reads for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub up_pressed: bool,
    pub down_pressed: bool,
}

/// Levels to drive for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputFrame {
    pub output_up: bool,
    pub output_down: bool,
    /// True while no button is held.
    pub indicator_idle: bool,
}

/// The four values reported to the endpoint every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySample {
    pub input_up: bool,
    pub input_down: bool,
    pub output_up: bool,
    pub output_down: bool,
}

impl TelemetrySample {
    pub fn new(raw: RawInputs, out: OutputFrame) -> Self {
        Self {
            input_up: raw.up_pressed,
            input_down: raw.down_pressed,
            output_up: out.output_up,
            output_down: out.output_down,
        }
    }

    /// Telemetry keys and values in publish order.
    pub fn fields(&self) -> [(&'static str, bool); 4] {
        [
            ("ButtonUpInput", self.input_up),
            ("ButtonDownInput", self.input_down),
            ("ButtonUpOutput", self.output_up),
            ("ButtonDownOutput", self.output_down),
        ]
    }
}

/// Apply the control policy to one set of raw readings.
pub fn transform(raw: RawInputs, state: &ControlState) -> OutputFrame {
    let (up, down) = if state.invert_buttons {
        (raw.down_pressed, raw.up_pressed)
    } else {
        (raw.up_pressed, raw.down_pressed)
    };

    OutputFrame {
        output_up: (up && !state.block_buttons) || state.force_up,
        output_down: (down && !state.block_buttons) || state.force_down,
        indicator_idle: !(up || down),
    }
}
