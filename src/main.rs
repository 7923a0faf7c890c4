//! Mesh gateway firmware — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  UartSerial     EspNowMesh      StatusLed   SystemClock  │
//! │  (SerialPort)   (MeshTransport) (Indicator) (Clock)      │
//! │  LogEventSink                                            │
//! │  (EventSink)                                             │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │        Gateway (pure logic, polled forever)        │  │
//! │  │  decoder · dispatcher · chunked transfer · encoder │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use meshgate::adapters::espnow::{EspNowMesh, node_mac};
use meshgate::adapters::log_sink::LogEventSink;
use meshgate::adapters::time::SystemClock;
use meshgate::adapters::uart::UartSerial;
use meshgate::drivers::status_led::StatusLed;
use meshgate::{Gateway, GatewayConfig};

const NVS_NAMESPACE: &str = "meshgate";
const NVS_CONFIG_KEY: &str = "config";
const CONFIG_BLOB_MAX: usize = 128;

fn load_config(nvs: &EspNvs<NvsDefault>) -> GatewayConfig {
    let mut buf = [0u8; CONFIG_BLOB_MAX];
    match nvs.get_raw(NVS_CONFIG_KEY, &mut buf) {
        Ok(Some(blob)) => match GatewayConfig::from_blob(blob) {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("Stored config rejected ({}), using defaults", e);
                GatewayConfig::default()
            }
        },
        Ok(None) => {
            info!("No stored config, using defaults");
            GatewayConfig::default()
        }
        Err(e) => {
            warn!("NVS read failed ({}), using defaults", e);
            GatewayConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("meshgate v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Configuration ──────────────────────────────────────
    let config = match EspNvs::new(nvs_partition.clone(), NVS_NAMESPACE, true) {
        Ok(nvs) => load_config(&nvs),
        Err(e) => {
            warn!("NVS namespace unavailable ({}), using defaults", e);
            GatewayConfig::default()
        }
    };
    let mesh_settings = config.mesh.clone();

    // ── 3. Radio: station MAC derived from the gateway address ─
    let mut wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs_partition))?;
    let mac = node_mac(mesh_settings.network_id, mesh_settings.gateway_address);
    // SAFETY: called before the WiFi driver is started, with a valid
    // 6-byte locally administered unicast address.
    esp_idf_svc::sys::esp!(unsafe {
        esp_idf_svc::sys::esp_wifi_set_mac(esp_idf_svc::sys::wifi_interface_t_WIFI_IF_STA, mac.as_ptr())
    })?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start()?;
    let mesh = EspNowMesh::new(mesh_settings)?;

    // ── 4. Host link and indicator ────────────────────────────
    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.baud_rate)),
    )?;
    // SAFETY: the LED pin is not claimed by any other driver in this binary.
    let led_pin = unsafe { AnyOutputPin::new(i32::from(config.status_led_gpio)) };
    let led = StatusLed::new(PinDriver::output(led_pin)?);

    // ── 5. Run ───────────────────────────────────────────────
    // WiFi stays up for the lifetime of the ESP-NOW driver.
    let _wifi = wifi;
    let mut gateway = Gateway::new(
        &config,
        UartSerial::new(uart),
        mesh,
        led,
        SystemClock::new(),
        LogEventSink::new(),
    );
    gateway.run()
}
