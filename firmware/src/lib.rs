//! RP2040 firmware glue for the panel-to-HID pipeline.
//!
//! Platform pieces only: a GPIO-backed [`InputSource`](panel_core::InputSource),
//! the USB HID transport with its report descriptors, and the idle-rate
//! request plumbing. All debouncing, encoding, and scheduling lives in
//! [`panel_core`].

#![no_std]

#[cfg(not(any(
    feature = "keyboard-panel",
    feature = "gamepad-panel",
    feature = "analog-panel",
    feature = "composite-panel"
)))]
compile_error!("select a panel variant feature: keyboard-panel, gamepad-panel, analog-panel, or composite-panel");

pub mod gpio_input;
pub mod usb;

pub use gpio_input::GpioInputSource;
pub use usb::{
    configure_usb_hid, IdleRateHandler, PendingReport, ReportSignal, SignalTransport,
    REPORT_DESCRIPTOR,
};
