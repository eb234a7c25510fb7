//! GPIO-backed input source.

use embassy_rp::gpio::Input;
use panel_core::{InputSource, SourceId};

/// Samples panel switches wired to GPIO inputs with pull-ups.
///
/// Switches short their pin to ground, so a low level means "closed". The
/// source id is the position in the pin table, matching the sequential ids
/// the stock layouts assign in wiring order.
pub struct GpioInputSource<const N: usize> {
    pins: [Input<'static>; N],
}

impl<const N: usize> GpioInputSource<N> {
    pub fn new(pins: [Input<'static>; N]) -> Self {
        Self { pins }
    }
}

impl<const N: usize> InputSource for GpioInputSource<N> {
    fn sample(&mut self, id: SourceId) -> bool {
        // Ids outside the table read as open; layouts are validated against
        // the wiring at startup so this only guards miswired configs.
        self.pins
            .get(id.0 as usize)
            .map(|pin| pin.is_low())
            .unwrap_or(false)
    }
}
