//! USB HID transport: report descriptors, idle-rate requests, and the
//! handoff between the tick task and the USB writer task.

use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::Builder;
use portable_atomic::{AtomicU8, Ordering};

use panel_core::{Transport, TransportError, MAX_REPORT_LEN};

/// A finished report awaiting the USB writer task.
pub type PendingReport = heapless::Vec<u8, MAX_REPORT_LEN>;

/// Single-slot handoff between the tick task and the USB writer task.
/// Latest-value semantics: the slot holds at most one un-sent report.
pub type ReportSignal = Signal<CriticalSectionRawMutex, PendingReport>;

/// HID report descriptor for the two-player keycode-array panel: a keyboard
/// reporting eight simultaneous keys, no modifier byte.
#[cfg(all(
    feature = "keyboard-panel",
    not(any(
        feature = "gamepad-panel",
        feature = "analog-panel",
        feature = "composite-panel"
    ))
))]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Keycode array (8 slots) ---
    0x05, 0x07, //   Usage Page (Key Codes)
    0x95, 0x08, //   Report Count (8)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    //
    0xC0, // End Collection
];

/// HID report descriptor for the two-player bit-packed panel: 22 buttons
/// padded to 24 bits (3 report bytes).
#[cfg(all(
    feature = "gamepad-panel",
    not(any(feature = "analog-panel", feature = "composite-panel"))
))]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (22 used, padded to 24) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x18, //   Usage Maximum (Button 24)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x18, //   Report Count (24)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// HID report descriptor for the single-player axis-pair panel: signed X/Y
/// plus one byte of buttons.
#[cfg(all(feature = "analog-panel", not(feature = "composite-panel")))]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Stick ---
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x95, 0x02, //   Report Count (2)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Buttons ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x08, //   Usage Maximum (Button 8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x08, //   Report Count (8)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// HID report descriptor for the multiplexed composite: report id 1 is the
/// player-1 keyboard (modifier byte + 6 key slots), report id 2 the
/// player-2 buttons (11 used, padded to 16 bits).
#[cfg(feature = "composite-panel")]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    // --- Keyboard (report id 1) ---
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    //
    //   Modifier byte
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224)
    0x29, 0xE7, //   Usage Maximum (231)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x08, //   Report Count (8)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   Keycode array (6 slots)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    0xC0, // End Collection
    //
    // --- Buttons (report id 2) ---
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x02, //   Report ID (2)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x10, //   Report Count (16)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0xC0, // End Collection
];

/// Transport half handed to the scheduler: ready while the signal slot is
/// free, sending fills it for the USB writer task to drain.
pub struct SignalTransport {
    signal: &'static ReportSignal,
}

impl SignalTransport {
    pub fn new(signal: &'static ReportSignal) -> Self {
        Self { signal }
    }
}

impl Transport for SignalTransport {
    fn ready(&mut self) -> bool {
        !self.signal.signaled()
    }

    fn send(&mut self, report: &[u8]) -> Result<(), TransportError> {
        let pending = PendingReport::from_slice(report).map_err(|_| TransportError::Io)?;
        self.signal.signal(pending);
        Ok(())
    }
}

/// Handles HID GET_IDLE/SET_IDLE, sharing the rate with the tick task
/// through an atomic (HID units: 4 ms per count, 0 = report on change only).
pub struct IdleRateHandler {
    rate: &'static AtomicU8,
}

impl IdleRateHandler {
    pub fn new(rate: &'static AtomicU8) -> Self {
        Self { rate }
    }
}

impl RequestHandler for IdleRateHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, _id: ReportId, _data: &[u8]) -> OutResponse {
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, duration_ms: u32) {
        let units = (duration_ms / 4).min(u8::MAX as u32) as u8;
        self.rate.store(units, Ordering::Relaxed);
    }

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        Some(self.rate.load(Ordering::Relaxed) as u32 * 4)
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID writer for use by the writer task.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    request_handler: &'d mut dyn RequestHandler,
) -> HidWriter<'d, Driver<'d, USB>, 8> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(request_handler),
        poll_ms: 1,
        max_packet_size: 8,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    embassy_usb::class::hid::HidWriter::new(builder, state, config)
}
