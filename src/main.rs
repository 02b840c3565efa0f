//! ShutterLink Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioHardware       LogEventSink   NvsAdapter   MonotonicClock │
//! │  (Input+Output)     (EventSink)    (Settings)                  │
//! │  ThingsBoardEndpoint               PortalBridge                │
//! │  (Endpoint)                        (Provisioning)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  ControlState · Transform · RemoteLink                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{debug, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use shutterlink::adapters::hardware::GpioHardware;
use shutterlink::adapters::log_sink::LogEventSink;
use shutterlink::adapters::mqtt::ThingsBoardEndpoint;
use shutterlink::adapters::nvs::NvsAdapter;
use shutterlink::adapters::provisioning::PortalBridge;
use shutterlink::adapters::time::MonotonicClock;
use shutterlink::app::commands::AppCommand;
use shutterlink::app::ports::{ProvisioningPort, SettingsPort};
use shutterlink::app::service::AppService;
use shutterlink::config::SystemConfig;
use shutterlink::error::Error;
use shutterlink::pins;
use shutterlink::rpc::RpcInbox;
use shutterlink::settings::ConnectionConfig;

/// Filled by the MQTT task, drained by the control loop.
static INBOX: RpcInbox = RpcInbox::new();

/// The provisioning portal task calls `PORTAL.submit(..)`.
pub static PORTAL: PortalBridge = PortalBridge::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ShutterLink v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 2. Load credentials (or wait for provisioning) ────────
    let nvs = NvsAdapter::new().map_err(Error::from)?;
    let stored = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("No usable credentials ({}), waiting for provisioning", e);
            ConnectionConfig::default()
        }
    };

    // ── 3. Pins ───────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    // SAFETY: each GPIO number is claimed exactly once, here.
    let (up_in, down_in, up_out, down_out, led) = unsafe {
        (
            AnyIOPin::new(pins::BUTTON_UP_INPUT_GPIO),
            AnyIOPin::new(pins::BUTTON_DOWN_INPUT_GPIO),
            AnyIOPin::new(pins::BUTTON_UP_OUTPUT_GPIO),
            AnyIOPin::new(pins::BUTTON_DOWN_OUTPUT_GPIO),
            AnyIOPin::new(pins::STATUS_LED_GPIO),
        )
    };
    let mut hw = GpioHardware::new(
        PinDriver::input(up_in)?,
        PinDriver::input(down_in)?,
        PinDriver::output(up_out)?,
        PinDriver::output(down_out)?,
        PinDriver::output(led)?,
    );

    // ── 4. Network ────────────────────────────────────────────
    // Station credentials are stored by the Wi-Fi driver when the portal
    // provisions the device.
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let mut wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs_partition))?;
    wifi.start()?;
    if let Err(e) = wifi.connect() {
        warn!("WiFi: connect failed ({}), retrying in the background", e);
    }

    let mut endpoint = ThingsBoardEndpoint::new(&INBOX);
    let mut portal = &PORTAL;
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 5. Control loop ───────────────────────────────────────
    let mut app = AppService::new(config, stored);
    app.start(&mut sink);

    let mut next_wifi_check_ms = 0u64;
    loop {
        FreeRtos::delay_ms(app.config().control_loop_interval_ms);
        let now_ms = clock.uptime_ms();

        if let Some(cfg) = portal.take_pending() {
            app.handle_command(AppCommand::Provision(cfg), &mut endpoint, &mut sink);
        }

        app.tick(now_ms, &mut hw, &mut endpoint, &nvs, &mut sink);

        if now_ms >= next_wifi_check_ms {
            next_wifi_check_ms = now_ms + u64::from(app.config().reconnect_backoff_ms);
            debug!(
                "HEARTBEAT | tick {} link {:?}",
                app.tick_count(),
                app.link_state()
            );
            if !wifi.is_connected().unwrap_or(false) {
                if let Err(e) = wifi.connect() {
                    warn!("WiFi: reconnect failed ({})", e);
                }
            }
        }
    }
}
