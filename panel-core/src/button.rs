//! Logical button state and role bindings.

use crate::debounce::DebounceThresholds;
use crate::input::SourceId;

/// Which report axis a directional button drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
}

/// Semantic meaning of a button within its profile's report.
///
/// A button holds exactly one role, fixed at configuration time. Which roles
/// a profile accepts depends on its [`ReportGeometry`](crate::ReportGeometry);
/// mismatches are rejected when the profile is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Ordinary key, identified by its HID usage code.
    PlainKey(u8),
    /// Modifier key, identified by its bit position (0-7) in the modifier
    /// byte.
    ModifierKey(u8),
    /// Bit-packed gamepad button. The index selects bit `i % 8` of report
    /// byte `i / 8` and is part of the external contract: consumers map bit
    /// positions to logical buttons by this fixed index.
    GamepadBit(u8),
    /// Drives the given axis toward -127 while held.
    AxisNegative(Axis),
    /// Drives the given axis toward +127 while held.
    AxisPositive(Axis),
}

/// One physical input: its source, its role, and its filter state.
///
/// Buttons are constructed once at startup and owned exclusively by a single
/// [`DeviceProfile`](crate::DeviceProfile) for the process lifetime.
#[derive(Clone, Copy, Debug)]
pub struct LogicalButton {
    source_id: SourceId,
    role: Role,
    pub(crate) thresholds: DebounceThresholds,
    /// Last confirmed (filtered) state; `false` = released.
    pub(crate) debounced_state: bool,
    /// Countdown toward accepting a pending state flip.
    pub(crate) cycles_remaining: u8,
}

impl LogicalButton {
    /// Create a button in the released state, with the countdown armed for a
    /// press.
    pub const fn new(source_id: SourceId, role: Role, thresholds: DebounceThresholds) -> Self {
        Self {
            source_id,
            role,
            thresholds,
            debounced_state: false,
            cycles_remaining: thresholds.press,
        }
    }

    #[inline]
    #[must_use]
    pub const fn source_id(&self) -> SourceId {
        self.source_id
    }

    #[inline]
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Current debounced state: `true` while the button is confirmed pressed.
    #[inline]
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.debounced_state
    }
}
