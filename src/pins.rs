//! GPIO pin assignments for the ShutterLink relay board.
//!
//! Single source of truth — `main` builds its pin drivers from these
//! numbers rather than hard-coding them.

// ---------------------------------------------------------------------------
// Physical buttons (digital inputs, HIGH = pressed)
// ---------------------------------------------------------------------------

/// "Up" push-button.
pub const BUTTON_UP_INPUT_GPIO: i32 = 16;
/// "Down" push-button.
pub const BUTTON_DOWN_INPUT_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Relay outputs (HIGH = relay energised)
// ---------------------------------------------------------------------------

pub const BUTTON_UP_OUTPUT_GPIO: i32 = 5;
pub const BUTTON_DOWN_OUTPUT_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board LED.  Driven HIGH while both buttons are released.
pub const STATUS_LED_GPIO: i32 = 2;
