//! Device profiles: report geometry plus the buttons that feed one report.

use heapless::Vec;

use crate::button::{LogicalButton, Role};

/// Maximum number of buttons a single profile may own.
pub const MAX_BUTTONS: usize = 32;

/// Maximum encoded report length in bytes, including an optional report id.
pub const MAX_REPORT_LEN: usize = 16;

/// Byte layout of one output report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportGeometry {
    /// One bit per button, packed little-endian within each byte:
    /// `[button_bits_byte_0 .. byte_n]`.
    BitVector { bits: u8 },
    /// Boot-keyboard style array of keycodes, optionally preceded by a
    /// modifier byte: `[modifier_byte, key_1 .. key_capacity]`.
    ///
    /// Presses beyond `capacity` are dropped, never queued. Unused slots
    /// hold zero (the "no key" code).
    KeycodeArray { capacity: u8, has_modifier_byte: bool },
    /// Two signed axis bytes followed by packed button bits:
    /// `[x_byte, y_byte, button_bits...]`.
    AxisPair { button_bits: u8 },
}

impl ReportGeometry {
    /// Encoded length of the report body, excluding any report id prefix.
    #[must_use]
    pub const fn body_len(&self) -> usize {
        match *self {
            ReportGeometry::BitVector { bits } => bits.div_ceil(8) as usize,
            ReportGeometry::KeycodeArray {
                capacity,
                has_modifier_byte,
            } => capacity as usize + has_modifier_byte as usize,
            ReportGeometry::AxisPair { button_bits } => 2 + button_bits.div_ceil(8) as usize,
        }
    }
}

/// Error raised while building a [`DeviceProfile`].
///
/// Every binding is checked once at configuration time so the per-tick path
/// never has to branch on invalid roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// More buttons than [`MAX_BUTTONS`].
    TooManyButtons,
    /// The geometry encodes to more than [`MAX_REPORT_LEN`] bytes.
    ReportTooLong,
    /// A geometry that declares zero payload (no bits, no key slots).
    EmptyGeometry,
    /// A button role the profile's geometry cannot represent.
    RoleMismatch,
    /// A `GamepadBit` or `ModifierKey` index outside the declared range.
    BitIndexOutOfRange,
    /// A `ModifierKey` in a keycode array without a modifier byte.
    ModifierNotAvailable,
    /// A `PlainKey` bound to the reserved "no key" code zero.
    ReservedKeycode,
    /// A debounce threshold of zero cycles.
    ZeroThreshold,
    /// More devices than the scheduler can own.
    TooManyDevices,
}

/// Static configuration for one output report: an ordered set of buttons and
/// the geometry they encode into.
///
/// Profiles are built once at startup from a declarative binding table and
/// live for the process lifetime. Ownership of buttons is exclusive: no
/// button belongs to two profiles.
#[derive(Debug)]
pub struct DeviceProfile {
    buttons: Vec<LogicalButton, MAX_BUTTONS>,
    geometry: ReportGeometry,
    report_id: Option<u8>,
}

impl DeviceProfile {
    /// Build and validate a profile.
    ///
    /// `report_id` is set when several profiles are multiplexed over one
    /// transport; it becomes the first byte of every encoded report.
    /// Button order matters: it fixes keycode-array fill order and axis
    /// tie-breaking.
    pub fn new(
        geometry: ReportGeometry,
        report_id: Option<u8>,
        buttons: impl IntoIterator<Item = LogicalButton>,
    ) -> Result<Self, ConfigError> {
        if geometry.body_len() == 0 {
            return Err(ConfigError::EmptyGeometry);
        }
        if geometry.body_len() + report_id.is_some() as usize > MAX_REPORT_LEN {
            return Err(ConfigError::ReportTooLong);
        }

        let mut owned: Vec<LogicalButton, MAX_BUTTONS> = Vec::new();
        for button in buttons {
            validate_binding(&geometry, &button)?;
            owned
                .push(button)
                .map_err(|_| ConfigError::TooManyButtons)?;
        }

        Ok(Self {
            buttons: owned,
            geometry,
            report_id,
        })
    }

    #[inline]
    #[must_use]
    pub const fn geometry(&self) -> ReportGeometry {
        self.geometry
    }

    #[inline]
    #[must_use]
    pub const fn report_id(&self) -> Option<u8> {
        self.report_id
    }

    /// Total encoded report length, including the report id prefix if any.
    #[must_use]
    pub fn report_len(&self) -> usize {
        self.geometry.body_len() + self.report_id.is_some() as usize
    }

    #[must_use]
    pub fn buttons(&self) -> &[LogicalButton] {
        &self.buttons
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut [LogicalButton] {
        &mut self.buttons
    }
}

fn validate_binding(geometry: &ReportGeometry, button: &LogicalButton) -> Result<(), ConfigError> {
    if button.thresholds.press == 0 || button.thresholds.release == 0 {
        return Err(ConfigError::ZeroThreshold);
    }

    match (*geometry, button.role()) {
        (ReportGeometry::BitVector { bits }, Role::GamepadBit(i)) => {
            if i < bits {
                Ok(())
            } else {
                Err(ConfigError::BitIndexOutOfRange)
            }
        }
        (ReportGeometry::KeycodeArray { .. }, Role::PlainKey(code)) => {
            if code != 0 {
                Ok(())
            } else {
                Err(ConfigError::ReservedKeycode)
            }
        }
        (
            ReportGeometry::KeycodeArray {
                has_modifier_byte, ..
            },
            Role::ModifierKey(bit),
        ) => {
            if !has_modifier_byte {
                Err(ConfigError::ModifierNotAvailable)
            } else if bit > 7 {
                Err(ConfigError::BitIndexOutOfRange)
            } else {
                Ok(())
            }
        }
        (ReportGeometry::AxisPair { .. }, Role::AxisNegative(_) | Role::AxisPositive(_)) => Ok(()),
        (ReportGeometry::AxisPair { button_bits }, Role::GamepadBit(i)) => {
            if i < button_bits {
                Ok(())
            } else {
                Err(ConfigError::BitIndexOutOfRange)
            }
        }
        _ => Err(ConfigError::RoleMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Axis;
    use crate::debounce::DebounceThresholds;
    use crate::input::SourceId;

    fn b(id: u16, role: Role) -> LogicalButton {
        LogicalButton::new(SourceId(id), role, DebounceThresholds::symmetric(2))
    }

    #[test]
    fn test_body_len_per_geometry() {
        assert_eq!(ReportGeometry::BitVector { bits: 8 }.body_len(), 1);
        assert_eq!(ReportGeometry::BitVector { bits: 22 }.body_len(), 3);
        assert_eq!(
            ReportGeometry::KeycodeArray {
                capacity: 6,
                has_modifier_byte: true
            }
            .body_len(),
            7
        );
        assert_eq!(
            ReportGeometry::KeycodeArray {
                capacity: 8,
                has_modifier_byte: false
            }
            .body_len(),
            8
        );
        assert_eq!(ReportGeometry::AxisPair { button_bits: 8 }.body_len(), 3);
    }

    #[test]
    fn test_report_id_extends_length() {
        let profile = DeviceProfile::new(
            ReportGeometry::BitVector { bits: 8 },
            Some(2),
            [b(0, Role::GamepadBit(0))],
        )
        .unwrap();
        assert_eq!(profile.report_len(), 2);
    }

    #[test]
    fn test_rejects_role_geometry_mismatch() {
        let err = DeviceProfile::new(
            ReportGeometry::BitVector { bits: 8 },
            None,
            [b(0, Role::PlainKey(0x04))],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::RoleMismatch);

        let err = DeviceProfile::new(
            ReportGeometry::KeycodeArray {
                capacity: 6,
                has_modifier_byte: true,
            },
            None,
            [b(0, Role::AxisNegative(Axis::X))],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::RoleMismatch);
    }

    #[test]
    fn test_rejects_out_of_range_bit_index() {
        let err = DeviceProfile::new(
            ReportGeometry::BitVector { bits: 8 },
            None,
            [b(0, Role::GamepadBit(8))],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::BitIndexOutOfRange);
    }

    #[test]
    fn test_rejects_modifier_without_modifier_byte() {
        let err = DeviceProfile::new(
            ReportGeometry::KeycodeArray {
                capacity: 8,
                has_modifier_byte: false,
            },
            None,
            [b(0, Role::ModifierKey(1))],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ModifierNotAvailable);
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let button = LogicalButton::new(
            SourceId(0),
            Role::GamepadBit(0),
            DebounceThresholds::new(0, 2),
        );
        let err = DeviceProfile::new(ReportGeometry::BitVector { bits: 8 }, None, [button])
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroThreshold);
    }

    #[test]
    fn test_rejects_reserved_keycode_zero() {
        let err = DeviceProfile::new(
            ReportGeometry::KeycodeArray {
                capacity: 6,
                has_modifier_byte: true,
            },
            None,
            [b(0, Role::PlainKey(0))],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ReservedKeycode);
    }

    #[test]
    fn test_axis_pair_accepts_directions_and_bits() {
        let profile = DeviceProfile::new(
            ReportGeometry::AxisPair { button_bits: 2 },
            None,
            [
                b(0, Role::AxisNegative(Axis::X)),
                b(1, Role::AxisPositive(Axis::X)),
                b(2, Role::AxisNegative(Axis::Y)),
                b(3, Role::AxisPositive(Axis::Y)),
                b(4, Role::GamepadBit(0)),
                b(5, Role::GamepadBit(1)),
            ],
        )
        .unwrap();
        assert_eq!(profile.report_len(), 3);
        assert_eq!(profile.buttons().len(), 6);
    }
}
