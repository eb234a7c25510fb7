//! Stock panel configurations.
//!
//! Binding tables for the control panels this firmware family shipped on.
//! Source ids are sequential and follow the physical wiring order; the input
//! source (GPIO bank, test mock) resolves them positionally.

use panel_core::{
    Axis, ConfigError, DebounceThresholds, DeviceProfile, LogicalButton, ReportGeometry, Role,
    SourceId,
};

use crate::keycode::{modifier, Keycode};

/// Fast press, slightly longer release; suits clicky microswitches.
pub const KEYBOARD_THRESHOLDS: DebounceThresholds = DebounceThresholds::new(1, 2);

/// Heavily filtered press for worn leaf switches; the bit-packed panel pair.
pub const GAMEPAD_THRESHOLDS: DebounceThresholds = DebounceThresholds::new(20, 4);

/// Balanced pair used by the analog-style panel.
pub const ANALOG_THRESHOLDS: DebounceThresholds = DebounceThresholds::new(7, 4);

fn key(id: u16, code: Keycode, thresholds: DebounceThresholds) -> LogicalButton {
    LogicalButton::new(SourceId(id), Role::PlainKey(code.code()), thresholds)
}

fn bit(id: u16, index: u8, thresholds: DebounceThresholds) -> LogicalButton {
    LogicalButton::new(SourceId(id), Role::GamepadBit(index), thresholds)
}

/// Two-player keyboard panel: 22 inputs reported as a plain 8-slot keycode
/// array (no modifier byte).
///
/// Binding order matches the panel wiring: player 1 buttons, player 2
/// buttons, then both joysticks.
pub fn two_player_keyboard() -> Result<DeviceProfile, ConfigError> {
    use Keycode::*;

    let codes = [
        // left (player 1) buttons
        Z, X, C, V, B, N, M, // X is the green start button
        // right (player 2) buttons
        Num0, Kp5, Num2, Num3, Num4, KpPlus, Num6, // Num2 is the yellow start button
        // left joystick: up, right, down, left
        W, D, S, A, // right joystick: right, down, left, up
        Kp6, Kp2, Kp4, Kp8,
    ];

    DeviceProfile::new(
        ReportGeometry::KeycodeArray {
            capacity: 8,
            has_modifier_byte: false,
        },
        None,
        codes
            .iter()
            .enumerate()
            .map(|(id, &code)| key(id as u16, code, KEYBOARD_THRESHOLDS)),
    )
}

/// Two-player gamepad panel: 22 inputs bit-packed into a 3-byte report, one
/// bit per button in wiring order.
pub fn two_player_gamepad() -> Result<DeviceProfile, ConfigError> {
    DeviceProfile::new(
        ReportGeometry::BitVector { bits: 22 },
        None,
        (0..22).map(|i| bit(i, i as u8, GAMEPAD_THRESHOLDS)),
    )
}

/// Single-player analog-style panel: the joystick drives a signed X/Y axis
/// pair, followed by one byte of button bits
/// (`[A, B, C, D, E, F, Start, Extra]`).
pub fn analog_gamepad() -> Result<DeviceProfile, ConfigError> {
    let t = ANALOG_THRESHOLDS;
    let stick = [
        Role::AxisNegative(Axis::Y), // up
        Role::AxisPositive(Axis::Y), // down
        Role::AxisNegative(Axis::X), // left
        Role::AxisPositive(Axis::X), // right
    ];

    DeviceProfile::new(
        ReportGeometry::AxisPair { button_bits: 8 },
        None,
        stick
            .iter()
            .enumerate()
            .map(|(id, &role)| LogicalButton::new(SourceId(id as u16), role, t))
            .chain((0..8).map(|i| bit(4 + i, i as u8, t))),
    )
}

/// Two-player composite multiplexed over one transport: player 1 as a
/// modifier-bearing keyboard (report id 1), player 2 as bit-packed gamepad
/// buttons (report id 2).
///
/// Device order is the service priority order.
pub fn composite_two_player() -> Result<(DeviceProfile, DeviceProfile), ConfigError> {
    use Keycode::*;

    let t = KEYBOARD_THRESHOLDS;
    let keyboard = DeviceProfile::new(
        ReportGeometry::KeycodeArray {
            capacity: 6,
            has_modifier_byte: true,
        },
        Some(1),
        [
            key(0, W, t), // up
            key(1, S, t), // down
            key(2, A, t), // left
            key(3, D, t), // right
            // start doubles as shift for combo bindings
            LogicalButton::new(SourceId(4), Role::ModifierKey(modifier::LEFT_SHIFT), t),
            key(5, Z, t),
            key(6, X, t),
            key(7, C, t),
            key(8, V, t),
            key(9, B, t),
            key(10, N, t),
        ],
    )?;

    let gamepad = DeviceProfile::new(
        ReportGeometry::BitVector { bits: 11 },
        Some(2),
        (0..11).map(|i| bit(11 + i, i as u8, GAMEPAD_THRESHOLDS)),
    )?;

    Ok((keyboard, gamepad))
}
