//! Hardware adapter — bridges GPIO pins to domain port traits.
//!
//! Generic over `embedded-hal` digital pins, so the same adapter drives
//! ESP-IDF `PinDriver`s on target and mock pins in host tests.  This is
//! the only module in the system that touches actual pins.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::app::ports::{InputPort, OutputPort};
use crate::control::RawInputs;

/// Two button inputs, two relay outputs and a status LED.
///
/// Inputs are active-high.  A read error is treated as "not pressed";
/// write errors are ignored.
pub struct GpioHardware<UpIn, DownIn, UpOut, DownOut, Led> {
    up_in: UpIn,
    down_in: DownIn,
    up_out: UpOut,
    down_out: DownOut,
    led: Led,
}

impl<UpIn, DownIn, UpOut, DownOut, Led> GpioHardware<UpIn, DownIn, UpOut, DownOut, Led>
where
    UpIn: InputPin,
    DownIn: InputPin,
    UpOut: OutputPin,
    DownOut: OutputPin,
    Led: OutputPin,
{
    pub fn new(up_in: UpIn, down_in: DownIn, up_out: UpOut, down_out: DownOut, led: Led) -> Self {
        Self {
            up_in,
            down_in,
            up_out,
            down_out,
            led,
        }
    }

    /// Give the pins back (tests inspect mock pins this way).
    pub fn release(self) -> (UpIn, DownIn, UpOut, DownOut, Led) {
        (self.up_in, self.down_in, self.up_out, self.down_out, self.led)
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<UpIn, DownIn, UpOut, DownOut, Led> InputPort for GpioHardware<UpIn, DownIn, UpOut, DownOut, Led>
where
    UpIn: InputPin,
    DownIn: InputPin,
{
    fn read_inputs(&mut self) -> RawInputs {
        RawInputs {
            up_pressed: self.up_in.is_high().unwrap_or(false),
            down_pressed: self.down_in.is_high().unwrap_or(false),
        }
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<UpIn, DownIn, UpOut, DownOut, Led> OutputPort
    for GpioHardware<UpIn, DownIn, UpOut, DownOut, Led>
where
    UpOut: OutputPin,
    DownOut: OutputPin,
    Led: OutputPin,
{
    fn set_output_up(&mut self, active: bool) {
        let _ = self.up_out.set_state(PinState::from(active));
    }

    fn set_output_down(&mut self, active: bool) {
        let _ = self.down_out.set_state(PinState::from(active));
    }

    fn set_indicator(&mut self, idle: bool) {
        // LED is wired to light while idle.
        let _ = self.led.set_state(PinState::from(idle));
    }
}
