//! Report transport trait and error types.

/// Error type for report handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The previous report has not been accepted yet.
    Busy,
    /// USB/communication I/O error.
    Io,
}

/// Trait for the report transport (USB HID interrupt endpoint, BLE, a test
/// recorder).
///
/// The scheduler only calls [`send`](Transport::send) immediately after
/// [`ready`](Transport::ready) returned `true` in the same tick-handling
/// pass. A transport that is not ready is never a fatal condition; the
/// scheduler keeps the device dirty and retries on the next tick.
pub trait Transport {
    /// Check whether the transport can accept a report right now.
    fn ready(&mut self) -> bool;

    /// Hand off a finished report buffer.
    ///
    /// The buffer is fully built before this call and is not touched again
    /// until the next encode.
    fn send(&mut self, report: &[u8]) -> Result<(), TransportError>;
}
