#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Ticker};
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::{Builder, Config as UsbConfig};
use portable_atomic::{AtomicU8, Ordering};
use static_cell::StaticCell;

use panel_core::ReportScheduler;
use panel_to_hid::{configure_usb_hid, GpioInputSource, IdleRateHandler, ReportSignal, SignalTransport};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// Scheduling tick period. Thresholds in the stock layouts assume this.
const TICK: Duration = Duration::from_millis(1);

/// Scheduler ticks per HID idle unit (4 ms) at the 1 ms tick.
const TICKS_PER_IDLE_UNIT: u16 = 4;

/// Number of wired panel inputs.
const NUM_INPUTS: usize = 22;

/// Signal for handing finished reports from the tick task to the USB
/// writer task. Holds at most one pending report per device in flight.
static REPORT_SIGNAL: StaticCell<ReportSignal> = StaticCell::new();

/// Host-configured idle rate in 4 ms units, written by the control request
/// handler and read by the tick task.
static IDLE_RATE: AtomicU8 = AtomicU8::new(0);

/// USB device configuration buffers.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state and request handler.
static HID_STATE: StaticCell<State> = StaticCell::new();
static IDLE_HANDLER: StaticCell<IdleRateHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("panel-to-hid starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal = REPORT_SIGNAL.init(ReportSignal::new());

    // --- Panel inputs (pull-up, switch shorts to ground) ---
    let pins: [Input<'static>; NUM_INPUTS] = [
        Input::new(p.PIN_0, Pull::Up),
        Input::new(p.PIN_1, Pull::Up),
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
        Input::new(p.PIN_16, Pull::Up),
        Input::new(p.PIN_17, Pull::Up),
        Input::new(p.PIN_18, Pull::Up),
        Input::new(p.PIN_19, Pull::Up),
        Input::new(p.PIN_20, Pull::Up),
        Input::new(p.PIN_21, Pull::Up),
    ];
    let input = GpioInputSource::new(pins);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("panel-to-hid");
    usb_config.product = Some("Arcade Panel");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    // Configure HID class with the idle-rate request handler
    let hid_state = HID_STATE.init(State::new());
    let idle_handler = IDLE_HANDLER.init(IdleRateHandler::new(&IDLE_RATE));
    let hid_writer = configure_usb_hid(&mut builder, hid_state, idle_handler);

    // Build the USB device
    let usb_device = builder.build();

    // On-board LED: lit once the host has enumerated us
    let led = Output::new(p.PIN_25, Level::Low);

    // Watchdog: the tick task must keep feeding it
    let mut watchdog = Watchdog::new(p.WATCHDOG);
    watchdog.start(Duration::from_millis(1_000));

    // Spawn tasks
    spawner.spawn(usb_task(usb_device)).unwrap();
    spawner.spawn(writer_task(hid_writer, signal, led)).unwrap();
    spawner.spawn(tick_task(input, signal, watchdog)).unwrap();

    info!("panel-to-hid initialized, scanning...");
}

/// Build the scheduler for the selected panel variant.
fn build_scheduler() -> ReportScheduler {
    let mut scheduler = ReportScheduler::new(TICKS_PER_IDLE_UNIT);

    #[cfg(feature = "composite-panel")]
    {
        let (keyboard, gamepad) = panel_layouts::composite_two_player().unwrap();
        scheduler.add_device(keyboard).unwrap();
        scheduler.add_device(gamepad).unwrap();
    }
    #[cfg(all(feature = "analog-panel", not(feature = "composite-panel")))]
    scheduler
        .add_device(panel_layouts::analog_gamepad().unwrap())
        .unwrap();
    #[cfg(all(
        feature = "gamepad-panel",
        not(any(feature = "analog-panel", feature = "composite-panel"))
    ))]
    scheduler
        .add_device(panel_layouts::two_player_gamepad().unwrap())
        .unwrap();
    #[cfg(all(
        feature = "keyboard-panel",
        not(any(
            feature = "gamepad-panel",
            feature = "analog-panel",
            feature = "composite-panel"
        ))
    ))]
    scheduler
        .add_device(panel_layouts::two_player_keyboard().unwrap())
        .unwrap();

    scheduler
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// Writer task - drains finished reports into the HID interrupt endpoint.
#[embassy_executor::task]
async fn writer_task(
    mut writer: HidWriter<'static, Driver<'static, USB>, 8>,
    signal: &'static ReportSignal,
    mut led: Output<'static>,
) {
    writer.ready().await;
    led.set_high();
    info!("USB HID ready, reporting...");

    loop {
        let report = signal.wait().await;
        if let Err(e) = writer.write(&report).await {
            error!("report write failed: {:?}", e);
        }
    }
}

/// Tick task - samples, debounces, and schedules reports at a fixed rate.
#[embassy_executor::task]
async fn tick_task(
    mut input: GpioInputSource<NUM_INPUTS>,
    signal: &'static ReportSignal,
    mut watchdog: Watchdog,
) {
    let mut scheduler = build_scheduler();
    let mut transport = SignalTransport::new(signal);
    let mut ticker = Ticker::every(TICK);

    loop {
        ticker.next().await;
        watchdog.feed();

        // Pick up idle-rate changes from the control endpoint.
        let rate = IDLE_RATE.load(Ordering::Relaxed);
        if rate != scheduler.get_idle() {
            scheduler.set_idle(rate);
        }

        scheduler.tick(&mut input, &mut transport);
    }
}
