//! Report buffers and the encoding policy.
//!
//! Encoding is a pure function of the profile's current debounced state: the
//! buffer is zero-filled and fully rewritten on every call, never patched
//! incrementally, so two encodes over unchanged state are byte-identical.

use crate::button::{Axis, Role};
use crate::profile::{DeviceProfile, ReportGeometry, MAX_REPORT_LEN};

/// Axis extreme written while exactly one direction of an axis is held.
const AXIS_EXTREME: i8 = 127;

/// A fixed-size output record describing current input state.
///
/// The buffer is transient: rebuilt each time a send is due and logically
/// discarded after handoff to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    buf: [u8; MAX_REPORT_LEN],
    len: usize,
}

impl Report {
    pub const fn empty() -> Self {
        Self {
            buf: [0; MAX_REPORT_LEN],
            len: 0,
        }
    }

    /// The encoded bytes, valid until the next [`encode`].
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::empty()
    }
}

/// Encode the profile's current debounced state into `report`.
///
/// Infallible for a validated profile: overflow and conflicts are resolved
/// by policy, not by error.
///
/// - Keycode arrays drop presses beyond capacity, silently and without
///   touching adjacent bytes.
/// - Opposing axis directions resolve by declaration order: the last one
///   processed wins.
pub fn encode(profile: &DeviceProfile, report: &mut Report) {
    report.len = profile.report_len();
    report.buf = [0; MAX_REPORT_LEN];

    let mut offset = 0;
    if let Some(id) = profile.report_id() {
        report.buf[0] = id;
        offset = 1;
    }
    let body = &mut report.buf[offset..];

    match profile.geometry() {
        ReportGeometry::BitVector { .. } => {
            for button in profile.buttons() {
                if let (Role::GamepadBit(i), true) = (button.role(), button.is_pressed()) {
                    body[(i >> 3) as usize] |= 1 << (i & 7);
                }
            }
        }
        ReportGeometry::KeycodeArray {
            capacity,
            has_modifier_byte,
        } => {
            let first_slot = has_modifier_byte as usize;
            let mut next = 0usize;
            for button in profile.buttons() {
                if !button.is_pressed() {
                    continue;
                }
                match button.role() {
                    Role::ModifierKey(bit) if has_modifier_byte => {
                        body[0] |= 1 << bit;
                    }
                    Role::PlainKey(code) if next < capacity as usize => {
                        body[first_slot + next] = code;
                        next += 1;
                    }
                    // Presses beyond capacity are dropped by policy.
                    _ => {}
                }
            }
        }
        ReportGeometry::AxisPair { .. } => {
            for button in profile.buttons() {
                if !button.is_pressed() {
                    continue;
                }
                match button.role() {
                    Role::AxisNegative(axis) => {
                        body[axis_byte(axis)] = (-AXIS_EXTREME) as u8;
                    }
                    Role::AxisPositive(axis) => {
                        body[axis_byte(axis)] = AXIS_EXTREME as u8;
                    }
                    Role::GamepadBit(i) => {
                        body[2 + (i >> 3) as usize] |= 1 << (i & 7);
                    }
                    _ => {}
                }
            }
        }
    }
}

#[inline]
const fn axis_byte(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
    }
}
