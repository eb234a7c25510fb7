//! Change- and idle-rate-driven report delivery.

use heapless::Vec;

use crate::debounce;
use crate::input::InputSource;
use crate::profile::{ConfigError, DeviceProfile};
use crate::report::{self, Report};
use crate::transport::Transport;

/// Maximum number of device profiles multiplexed over one transport.
pub const MAX_DEVICES: usize = 4;

/// One scheduled device: its profile, its report buffer, and its delivery
/// state.
#[derive(Debug)]
struct Device {
    profile: DeviceProfile,
    /// Exclusively owned by the scheduler; rebuilt in full before every
    /// handoff.
    report: Report,
    /// A report is owed but not yet accepted by the transport.
    dirty: bool,
    /// Ticks until the next forced resend while an idle rate is set.
    idle_countdown: u16,
}

/// Drives the whole pipeline once per tick: sample, debounce, and deliver.
///
/// The scheduler owns one or more [`DeviceProfile`]s sharing a single
/// transport. A device becomes *dirty* when any of its buttons changed
/// debounced state this tick, or when its idle-rate refresh comes due. Dirty
/// devices are serviced in declared order, one report per transport-ready
/// opportunity; a device that cannot be sent stays dirty and is retried next
/// tick, so no report is ever dropped silently.
///
/// # Idle rate
///
/// The idle rate follows the HID contract: a value of 0 sends only on
/// change; a value of N forces a resend at least once every N idle periods
/// (4 ms units), restarting the countdown on every send, changed or forced.
/// `ticks_per_idle_unit` converts those units to scheduler ticks, e.g. 4 at
/// a 1 ms tick.
pub struct ReportScheduler {
    devices: Vec<Device, MAX_DEVICES>,
    /// Host-configured idle rate in 4 ms units; 0 = send on change only.
    idle_rate: u8,
    ticks_per_idle_unit: u16,
}

impl ReportScheduler {
    pub fn new(ticks_per_idle_unit: u16) -> Self {
        Self {
            devices: Vec::new(),
            idle_rate: 0,
            ticks_per_idle_unit,
        }
    }

    /// Register a device. Declaration order is the service priority order
    /// and, for multiplexed setups, fixed for the life of the scheduler.
    pub fn add_device(&mut self, profile: DeviceProfile) -> Result<(), ConfigError> {
        self.devices
            .push(Device {
                profile,
                report: Report::empty(),
                dirty: false,
                idle_countdown: 0,
            })
            .map_err(|_| ConfigError::TooManyDevices)
    }

    /// Current idle rate in 4 ms units.
    #[must_use]
    pub fn get_idle(&self) -> u8 {
        self.idle_rate
    }

    /// Set the idle rate (HID SET_IDLE), restarting every device's periodic
    /// countdown.
    pub fn set_idle(&mut self, rate: u8) {
        self.idle_rate = rate;
        let ticks = self.idle_ticks();
        for device in &mut self.devices {
            device.idle_countdown = ticks;
        }
    }

    fn idle_ticks(&self) -> u16 {
        self.idle_rate as u16 * self.ticks_per_idle_unit
    }

    /// The profile registered at `index`, for inspecting debounced state.
    #[must_use]
    pub fn device_profile(&self, index: usize) -> Option<&DeviceProfile> {
        self.devices.get(index).map(|d| &d.profile)
    }

    /// Run one scheduling tick: sample and debounce every button, mark
    /// dirty devices, and deliver as many owed reports as the transport
    /// accepts. Returns the number of reports handed off.
    pub fn tick<I: InputSource, T: Transport>(&mut self, input: &mut I, transport: &mut T) -> usize {
        let idle_enabled = self.idle_rate > 0;
        let idle_ticks = self.idle_ticks();

        for device in &mut self.devices {
            let mut changed = false;
            for button in device.profile.buttons_mut() {
                let raw = input.sample(button.source_id());
                if debounce::update(button, raw) {
                    changed = true;
                }
            }
            if changed {
                device.dirty = true;
            }
            if idle_enabled {
                if device.idle_countdown > 0 {
                    device.idle_countdown -= 1;
                }
                if device.idle_countdown == 0 {
                    device.dirty = true;
                }
            }
        }

        // Service pass: lowest index first, each device at most once. A
        // device serviced here is not revisited until it goes dirty again.
        let mut serviced = [false; MAX_DEVICES];
        let mut sent = 0;
        loop {
            let Some(index) = self
                .devices
                .iter()
                .enumerate()
                .find(|(i, d)| d.dirty && !serviced[*i])
                .map(|(i, _)| i)
            else {
                break;
            };
            if !transport.ready() {
                break;
            }

            let device = &mut self.devices[index];
            report::encode(&device.profile, &mut device.report);
            serviced[index] = true;
            match transport.send(device.report.as_bytes()) {
                Ok(()) => {
                    device.dirty = false;
                    device.idle_countdown = idle_ticks;
                    sent += 1;
                }
                // Stays dirty; retried on the next tick.
                Err(_) => break,
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::button::{LogicalButton, Role};
    use crate::debounce::DebounceThresholds;
    use crate::input::SourceId;
    use crate::profile::ReportGeometry;
    use crate::transport::TransportError;

    /// Scripted input: a bitmask of currently closed switches.
    struct MockInput {
        closed: u32,
    }

    impl MockInput {
        fn new() -> Self {
            Self { closed: 0 }
        }

        fn close(&mut self, id: u16) {
            self.closed |= 1 << id;
        }

        fn open(&mut self, id: u16) {
            self.closed &= !(1 << id);
        }
    }

    impl InputSource for MockInput {
        fn sample(&mut self, id: SourceId) -> bool {
            self.closed & (1 << id.0) != 0
        }
    }

    /// Recording transport with scriptable readiness.
    struct MockTransport {
        ready: bool,
        fail_sends: bool,
        sent: Vec<Vec<u8>>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                ready: true,
                fail_sends: false,
                sent: Vec::new(),
            }
        }
    }

    impl Transport for MockTransport {
        fn ready(&mut self) -> bool {
            self.ready
        }

        fn send(&mut self, report: &[u8]) -> Result<(), TransportError> {
            if self.fail_sends {
                return Err(TransportError::Io);
            }
            self.sent.push(report.to_vec());
            Ok(())
        }
    }

    fn bit_profile(report_id: Option<u8>, first_source: u16, bits: u8) -> DeviceProfile {
        DeviceProfile::new(
            ReportGeometry::BitVector { bits },
            report_id,
            (0..bits).map(|i| {
                LogicalButton::new(
                    SourceId(first_source + i as u16),
                    Role::GamepadBit(i),
                    DebounceThresholds::symmetric(1),
                )
            }),
        )
        .unwrap()
    }

    fn scheduler_with(profiles: impl IntoIterator<Item = DeviceProfile>) -> ReportScheduler {
        let mut scheduler = ReportScheduler::new(1);
        for profile in profiles {
            scheduler.add_device(profile).unwrap();
        }
        scheduler
    }

    #[test]
    fn test_sends_only_on_change_with_idle_zero() {
        let mut scheduler = scheduler_with([bit_profile(None, 0, 8)]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        // Nothing pressed, nothing changed: no report.
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);

        // A press produces exactly one report, then silence again.
        input.close(3);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        assert_eq!(transport.sent, [[0b0000_1000]]);

        // The release produces one more.
        input.open(3);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent[1], [0u8]);
    }

    #[test]
    fn test_idle_rate_forces_periodic_resends() {
        let mut scheduler = scheduler_with([bit_profile(None, 0, 8)]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();
        scheduler.set_idle(3);

        // Change-triggered send at period 0 restarts the countdown.
        input.close(0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);

        // No further changes for 6 periods: forced resends at exactly
        // periods 3 and 6.
        let mut sends = Vec::new();
        for period in 1..=6 {
            if scheduler.tick(&mut input, &mut transport) > 0 {
                sends.push(period);
            }
        }
        assert_eq!(sends, [3, 6]);

        // Content is independent of the trigger: same bytes every time.
        assert_eq!(transport.sent, [[1u8], [1u8], [1u8]]);
    }

    #[test]
    fn test_set_idle_zero_stops_forced_resends() {
        let mut scheduler = scheduler_with([bit_profile(None, 0, 8)]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        scheduler.set_idle(1);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(scheduler.get_idle(), 1);

        scheduler.set_idle(0);
        for _ in 0..5 {
            assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        }
        assert_eq!(scheduler.get_idle(), 0);
    }

    #[test]
    fn test_idle_units_scale_by_ticks_per_unit() {
        // 4 scheduler ticks per idle unit, rate 2: resend every 8 ticks.
        let mut scheduler = ReportScheduler::new(4);
        scheduler.add_device(bit_profile(None, 0, 8)).unwrap();
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        scheduler.set_idle(2);
        input.close(0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);

        let mut sends = Vec::new();
        for tick in 1..=16 {
            if scheduler.tick(&mut input, &mut transport) > 0 {
                sends.push(tick);
            }
        }
        assert_eq!(sends, [8, 16]);
    }

    #[test]
    fn test_not_ready_transport_retries_without_loss() {
        let mut scheduler = scheduler_with([bit_profile(None, 0, 8)]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        transport.ready = false;
        input.close(5);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        assert!(transport.sent.is_empty());

        // Once the transport recovers, the owed report goes out -- exactly
        // one, reflecting current state.
        transport.ready = true;
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent, [[0b0010_0000]]);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
    }

    #[test]
    fn test_failed_send_keeps_device_dirty() {
        let mut scheduler = scheduler_with([bit_profile(None, 0, 8)]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        transport.fail_sends = true;
        input.close(0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);

        transport.fail_sends = false;
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent, [[1u8]]);
    }

    #[test]
    fn test_multiplexed_devices_serviced_in_priority_order() {
        let mut scheduler = scheduler_with([
            bit_profile(Some(1), 0, 8),
            bit_profile(Some(2), 8, 8),
        ]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        // Press one button on each device; both reports go out in the same
        // pass, device 0 first.
        input.close(0);
        input.close(8);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 2);
        assert_eq!(transport.sent, [std::vec![1u8, 1], std::vec![2u8, 1]]);
    }

    #[test]
    fn test_only_dirty_devices_are_serviced() {
        let mut scheduler = scheduler_with([
            bit_profile(Some(1), 0, 8),
            bit_profile(Some(2), 8, 8),
        ]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        // Only device 1 changes; device 0 stays silent.
        input.close(9);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent, [std::vec![2u8, 2]]);
    }

    #[test]
    fn test_one_report_per_ready_opportunity_when_constrained() {
        struct OneShotTransport {
            budget: usize,
            sent: Vec<Vec<u8>>,
        }
        impl Transport for OneShotTransport {
            fn ready(&mut self) -> bool {
                self.budget > 0
            }
            fn send(&mut self, report: &[u8]) -> Result<(), TransportError> {
                self.budget -= 1;
                self.sent.push(report.to_vec());
                Ok(())
            }
        }

        let mut scheduler = scheduler_with([
            bit_profile(Some(1), 0, 8),
            bit_profile(Some(2), 8, 8),
        ]);
        let mut input = MockInput::new();
        let mut transport = OneShotTransport {
            budget: 1,
            sent: Vec::new(),
        };

        input.close(0);
        input.close(8);

        // One ready slot this tick: only the higher-priority device sends.
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent, [std::vec![1u8, 1]]);

        // Next tick the remaining owed report is delivered.
        transport.budget = 1;
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent[1], std::vec![2u8, 1]);
    }

    #[test]
    fn test_debounce_thresholds_delay_reports() {
        let profile = DeviceProfile::new(
            ReportGeometry::BitVector { bits: 1 },
            None,
            [LogicalButton::new(
                SourceId(0),
                Role::GamepadBit(0),
                DebounceThresholds::new(3, 2),
            )],
        )
        .unwrap();
        let mut scheduler = scheduler_with([profile]);
        let mut input = MockInput::new();
        let mut transport = MockTransport::new();

        input.close(0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        assert_eq!(scheduler.tick(&mut input, &mut transport), 0);
        // Third consecutive closed sample confirms the press.
        assert_eq!(scheduler.tick(&mut input, &mut transport), 1);
        assert_eq!(transport.sent, [[1u8]]);
    }
}
