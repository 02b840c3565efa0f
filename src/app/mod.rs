//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the control loop orchestration: input transform,
//! remote link servicing and command dispatch.  All interaction with pins,
//! network and flash happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
