//! Base-station binary.
//!
//! Receives the sensor node's record stream over ESP-NOW and fans it
//! out across the worker threads: receiver translation, two liveness
//! watchdogs, the delivery lifecycle FSM, the connection status FSM,
//! and the board output workers (alarm, delivery LED, disconnected
//! blinker, display). Every worker drains exactly one bounded queue;
//! the timer-service callbacks only enqueue.

use core::ffi::c_void;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration as StdDuration;

use anyhow::{Result, anyhow};
use embassy_time::Duration;
use log::{error, info};

use lidwatch::adapters::espnow::{EspNowRadio, start_wifi};
use lidwatch::adapters::log_sink::LogEventSink;
use lidwatch::adapters::outputs::{ConnectionBoard, DeliveryBoard, PendingPosition, PositionRelay};
use lidwatch::adapters::stopwatch::{ElapsedStopwatch, StopwatchStart};
use lidwatch::adapters::time::EspClock;
use lidwatch::app::channels::{
    ChannelLinkSink, ChannelPositionSink, LID_POSITION_CHANNEL, LINK_CHANNEL,
    LINK_WATCHDOG, LINK_WATCHDOG_CHANNEL, RX_FRAME_CHANNEL, SENSOR_WATCHDOG,
    SENSOR_WATCHDOG_CHANNEL, recv_timeout,
};
use lidwatch::app::service::{ConnectionService, DeliveryService, ReceiverService};
use lidwatch::config::SystemConfig;
use lidwatch::drivers::hw_init;
use lidwatch::drivers::hw_timer::{EspOneShot, EspPeriodic};
use lidwatch::drivers::indicator::{BlinkIndicator, DISCONNECTED_BLINK, GpioIndicator};
use lidwatch::drivers::{alarm, display, indicator};
use lidwatch::events::{DisplayCommand, DisplayMessage};
use lidwatch::pins;
use lidwatch::timer::debounce::DebounceTimer;
use lidwatch::timer::watchdog::LivenessWatchdog;

// ── Shared statics ────────────────────────────────────────────
//
// The confirmation window and its pending position are reached from
// the delivery worker and the esp_timer callback, so they live in
// statics rather than on a worker's stack.

static PENDING: PendingPosition = PendingPosition::new();
static STOPWATCH_START: StopwatchStart = StopwatchStart::new();
static DELIVERY_WINDOW: OnceLock<DebounceTimer<EspOneShot, PositionRelay>> = OnceLock::new();

unsafe extern "C" fn delivery_window_expired(_arg: *mut c_void) {
    if let Some(window) = DELIVERY_WINDOW.get() {
        window.notify_expired();
    }
}

unsafe extern "C" fn link_watchdog_expired(_arg: *mut c_void) {
    LINK_WATCHDOG.expire();
}

unsafe extern "C" fn sensor_watchdog_expired(_arg: *mut c_void) {
    SENSOR_WATCHDOG.expire();
}

fn spawn(name: &str, body: impl FnOnce() + Send + 'static) {
    thread::Builder::new()
        .name(name.into())
        .spawn(body)
        .unwrap_or_else(|e| panic!("spawning {name} worker failed: {e}"));
}

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("LidWatch base station v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    let queue_wait = Duration::from_millis(u64::from(config.queue_wait_ms));

    if let Err(e) = hw_init::init_base_station() {
        error!("peripheral init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }

    lidwatch::app::channels::post(
        &lidwatch::app::channels::DISPLAY_CHANNEL,
        DisplayMessage::command(DisplayCommand::Init),
        "display",
    );

    // ── Radio up ──────────────────────────────────────────────
    let _wifi = start_wifi().map_err(|e| anyhow!("wifi sta start failed: {e}"))?;
    let radio = EspNowRadio::new(lidwatch::adapters::espnow::BASE_STATION_MAC)
        .map_err(|e| anyhow!("radio init failed: {e}"))?;
    radio
        .start_receiver()
        .map_err(|e| anyhow!("radio receive callback failed: {e}"))?;

    // ── Confirmation window ───────────────────────────────────
    let window_backend = EspOneShot::new(c"delivery_window", delivery_window_expired)
        .map_err(|e| anyhow!("confirmation window timer create failed: {e}"))?;
    let window = DELIVERY_WINDOW.get_or_init(|| {
        DebounceTimer::new(
            "delivery window",
            window_backend,
            PositionRelay::new(&PENDING),
        )
    });

    // ── Output workers ────────────────────────────────────────
    spawn("alarm", || alarm::run());
    spawn("delivery_led", || {
        indicator::delivery_led(pins::DELIVERY_LED_GPIO)
    });
    spawn("disconnected_blink", || {
        indicator::blinker(&DISCONNECTED_BLINK, pins::DISCONNECTED_LED_GPIO)
    });
    spawn("display", || {
        display::run(ElapsedStopwatch::new(EspClock::new(), &STOPWATCH_START))
    });

    // ── Watchdog workers ──────────────────────────────────────
    //
    // Two instances over one FSM: the link watchdog is fed by every
    // decodable frame, the sensor watchdog only by frames carrying a
    // live inclination signal.
    let link_backend = EspPeriodic::new(c"link_watchdog", link_watchdog_expired)
        .map_err(|e| anyhow!("link watchdog timer create failed: {e}"))?;
    let link_timeout = config.link_watchdog_ms;
    spawn("link_watchdog", move || {
        let mut sink = ChannelLinkSink;
        let mut watchdog = LivenessWatchdog::new("link watchdog", link_timeout, link_backend);
        if let Err(e) = watchdog.start(&mut sink) {
            error!("link watchdog start failed: {e}");
            return;
        }
        loop {
            if let Some(event) = recv_timeout(&LINK_WATCHDOG_CHANNEL, queue_wait) {
                if let Err(e) = watchdog.on_event(event, &mut sink) {
                    error!("link watchdog backend fault: {e}");
                }
            }
        }
    });

    let sensor_backend = EspPeriodic::new(c"sensor_watchdog", sensor_watchdog_expired)
        .map_err(|e| anyhow!("sensor watchdog timer create failed: {e}"))?;
    let sensor_timeout = config.signal_watchdog_ms;
    spawn("sensor_watchdog", move || {
        let mut sink = ChannelLinkSink;
        let mut watchdog =
            LivenessWatchdog::new("sensor watchdog", sensor_timeout, sensor_backend);
        if let Err(e) = watchdog.start(&mut sink) {
            error!("sensor watchdog start failed: {e}");
            return;
        }
        loop {
            if let Some(event) = recv_timeout(&SENSOR_WATCHDOG_CHANNEL, queue_wait) {
                if let Err(e) = watchdog.on_event(event, &mut sink) {
                    error!("sensor watchdog backend fault: {e}");
                }
            }
        }
    });

    // ── FSM workers ───────────────────────────────────────────
    let delivery_config = config.clone();
    spawn("delivery", move || {
        let mut service = DeliveryService::new(&delivery_config);
        let mut board = DeliveryBoard::new(
            window,
            &PENDING,
            GpioIndicator::new(pins::ACTIVITY_LED_GPIO),
            ElapsedStopwatch::new(EspClock::new(), &STOPWATCH_START),
        );
        let mut links = ChannelLinkSink;
        let mut sink = LogEventSink::new();
        loop {
            if let Some(position) = recv_timeout(&LID_POSITION_CHANNEL, queue_wait) {
                service.on_position(position, &mut board, &mut links, &mut sink);
            }
        }
    });

    spawn("connection", move || {
        let mut service = ConnectionService::new();
        let mut board = ConnectionBoard::new(
            GpioIndicator::new(pins::CONNECTED_LED_GPIO),
            BlinkIndicator::new(&DISCONNECTED_BLINK),
        );
        let mut sink = LogEventSink::new();
        loop {
            if let Some(event) = recv_timeout(&LINK_CHANNEL, queue_wait) {
                service.on_link_event(event, &mut board, &mut sink);
            }
        }
    });

    lidwatch::app::channels::post(
        &lidwatch::app::channels::DISPLAY_CHANNEL,
        DisplayMessage::command(DisplayCommand::Run),
        "display",
    );

    // ── Receiver loop (main thread) ───────────────────────────
    let mut service = ReceiverService;
    let mut link_heartbeat = LINK_WATCHDOG;
    let mut sensor_heartbeat = SENSOR_WATCHDOG;
    let mut positions = ChannelPositionSink;
    let mut links = ChannelLinkSink;
    let mut sink = LogEventSink::new();
    let mut traffic_led = false;

    info!("listening for sensor records");
    loop {
        let Some(frame) = recv_timeout(&RX_FRAME_CHANNEL, queue_wait) else {
            continue;
        };
        traffic_led = !traffic_led;
        hw_init::gpio_write(pins::BUILTIN_LED_GPIO, traffic_led);
        service.on_frame(
            &frame.bytes,
            &mut link_heartbeat,
            &mut sensor_heartbeat,
            &mut positions,
            &mut links,
            &mut sink,
        );
        // The receive loop has no natural idle point, so yield briefly
        // between frames to keep the idle task fed.
        thread::sleep(StdDuration::from_millis(1));
    }
}
