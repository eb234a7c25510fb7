//! HID keycodes and stock panel configurations.
//!
//! This crate turns the wiring of the supported control panels into
//! [`panel_core`] device profiles:
//!
//! - [`keycode`]: the HID keyboard usage table ([`Keycode`]) and modifier
//!   bit positions
//! - [`panels`]: one constructor per shipped panel variant
//!
//! Profiles are declarative data, built once at startup; the firmware picks
//! one and feeds it to a `ReportScheduler`.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod keycode;
pub mod panels;

// Re-export main items at crate root
pub use keycode::{modifier, Keycode};
pub use panels::{
    analog_gamepad, composite_two_player, two_player_gamepad, two_player_keyboard,
    ANALOG_THRESHOLDS, GAMEPAD_THRESHOLDS, KEYBOARD_THRESHOLDS,
};
