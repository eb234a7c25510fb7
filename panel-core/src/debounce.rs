//! Per-button debounce filter.
//!
//! Each button carries a countdown toward accepting a pending state flip.
//! A transition registers only after an *unbroken run* of contrary raw
//! samples: the instant a raw sample agrees with the confirmed state again,
//! the countdown is reloaded in full, cancelling any partial run caused by
//! contact bounce.

use crate::button::LogicalButton;

/// Consecutive-sample counts required to confirm each transition.
///
/// `press` confirms a press (released to pressed), `release` confirms a
/// release. The two are independent; asymmetric pairs let a panel register
/// presses quickly while filtering the longer bounce tail on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceThresholds {
    /// Unbroken closed samples needed to confirm a press.
    pub press: u8,
    /// Unbroken open samples needed to confirm a release.
    pub release: u8,
}

impl DebounceThresholds {
    pub const fn new(press: u8, release: u8) -> Self {
        Self { press, release }
    }

    /// Same count in both directions.
    pub const fn symmetric(cycles: u8) -> Self {
        Self {
            press: cycles,
            release: cycles,
        }
    }
}

impl Default for DebounceThresholds {
    /// ~5 ms in each direction at a 1 ms tick.
    fn default() -> Self {
        Self::symmetric(5)
    }
}

/// Countdown reload value for the transition pending out of the current
/// confirmed state.
#[inline]
const fn pending_reload(button: &LogicalButton) -> u8 {
    if button.debounced_state {
        button.thresholds.release
    } else {
        button.thresholds.press
    }
}

/// Feed one raw sample (`true` = switch closed) into the filter.
///
/// Returns `true` exactly when the debounced state flipped on this sample.
/// Side effects are confined to the passed button; there is no allocation
/// and no failure mode.
pub fn update(button: &mut LogicalButton, raw: bool) -> bool {
    if raw == button.debounced_state {
        // Hasn't changed, or still bouncing: reload the countdown.
        button.cycles_remaining = pending_reload(button);
        false
    } else {
        button.cycles_remaining -= 1;
        if button.cycles_remaining == 0 {
            button.debounced_state = raw;
            button.cycles_remaining = pending_reload(button);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Role;
    use crate::input::SourceId;

    fn button(thresholds: DebounceThresholds) -> LogicalButton {
        LogicalButton::new(SourceId(0), Role::GamepadBit(0), thresholds)
    }

    #[test]
    fn test_press_confirmed_on_exact_threshold() {
        let mut b = button(DebounceThresholds::new(3, 2));

        assert!(!update(&mut b, true));
        assert!(!update(&mut b, true));
        assert!(update(&mut b, true)); // third consecutive closed sample
        assert!(b.is_pressed());

        // Further closed samples report no change.
        assert!(!update(&mut b, true));
        assert!(b.is_pressed());
    }

    #[test]
    fn test_release_uses_own_threshold() {
        let mut b = button(DebounceThresholds::new(1, 2));

        assert!(update(&mut b, true)); // press confirms after a single sample
        assert!(b.is_pressed());

        assert!(!update(&mut b, false));
        assert!(update(&mut b, false)); // release needs two
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_hysteresis_one_matching_sample_resets_run() {
        let mut b = button(DebounceThresholds::new(3, 3));

        // Two contrary samples, then a bounce back to the confirmed state.
        assert!(!update(&mut b, true));
        assert!(!update(&mut b, true));
        assert!(!update(&mut b, false));
        assert!(!b.is_pressed());

        // The run restarts from scratch: three full samples needed again.
        assert!(!update(&mut b, true));
        assert!(!update(&mut b, true));
        assert!(update(&mut b, true));
        assert!(b.is_pressed());
    }

    #[test]
    fn test_changed_reported_exactly_once_per_flip() {
        let mut b = button(DebounceThresholds::symmetric(2));

        let mut changes = 0;
        for raw in [true, true, true, true, false, false, false] {
            if update(&mut b, raw) {
                changes += 1;
            }
        }
        assert_eq!(changes, 2); // one press, one release
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_asymmetric_arcade_pair() {
        // The 20/4 pair used by the bit-packed panel hardware.
        let mut b = button(DebounceThresholds::new(20, 4));

        for _ in 0..19 {
            assert!(!update(&mut b, true));
        }
        assert!(update(&mut b, true));
        assert!(b.is_pressed());

        for _ in 0..3 {
            assert!(!update(&mut b, false));
        }
        assert!(update(&mut b, false));
        assert!(!b.is_pressed());
    }
}
