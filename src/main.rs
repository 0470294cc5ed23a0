//! Firmware-Einstieg: WLAN hoch, Vertrags-Datum prüfen, dann UTxOs
//! pollen und Gutschriften an den Pumpen-Thread geben.

#[cfg(target_os = "espidf")]
mod hw;
#[cfg(target_os = "espidf")]
mod net;
#[cfg(target_os = "espidf")]
mod web;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    esp_idf_svc::log::EspLogger::initialize_default();

    let _handle = thread::Builder::new()
        .name("app".into())
        .stack_size(28 * 1024)
        .spawn(|| {
            if let Err(e) = app() {
                log::error!("app() failed: {e:?}");
            }
        })?;

    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(target_os = "espidf")]
fn app() -> anyhow::Result<()> {
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration as WifiCfg, EspWifi};

    use esp32_ada_pump::blockfrost::ChainDataSource;
    use esp32_ada_pump::config::{self, Status};
    use esp32_ada_pump::{control, datum, monitor::UtxoMonitor};

    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let pins = peripherals.pins;
    let modem = peripherals.modem;

    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop.clone())?;

    wifi.set_configuration(&WifiCfg::Client(ClientConfiguration {
        ssid: config::WIFI_SSID.try_into().unwrap(),
        password: config::WIFI_PASS.try_into().unwrap(),
        ..Default::default()
    }))?;
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    log::info!("WiFi connected. IP: {}", ip_info.ip);

    let pump_pin = hw::init_hw(pins)?;
    let state = Arc::new(Mutex::new(Status::default()));
    let ctrl_tx = control::spawn_control(pump_pin, state.clone())?;
    let _server = web::start_web(state.clone())?;

    let mut source = net::BlockfrostClient::new();

    // Vertragszustand einmalig beim Start prüfen
    match source.fetch_asset_state(config::ASSET_UNIT) {
        Ok(asset) => match datum::parse_datum(&asset.inline_datum, config::NETWORK) {
            Ok(d) => {
                log::info!(
                    "Autorität: {} | locked: {}",
                    d.authority_address,
                    d.is_locked
                );
                let mut s = state.lock().unwrap();
                s.authority_address = Some(d.authority_address);
                s.contract_locked = d.is_locked;
            }
            Err(e) => log::warn!("Datum nicht lesbar: {e}"),
        },
        Err(e) => log::warn!("Asset-Status nicht abrufbar: {e}"),
    }

    let mut monitor = UtxoMonitor::new();

    // Poll-Schleife mit WLAN-Watchdog
    loop {
        if !wifi.is_connected().unwrap_or(false) {
            log::warn!("WiFi lost, reconnecting...");
            let _ = wifi.connect();
            let _ = wifi.wait_netif_up();
            thread::sleep(Duration::from_secs(5));
            continue;
        }

        control::poll_once(&mut source, &mut monitor, &ctrl_tx, &state);
        thread::sleep(Duration::from_millis(config::POLL_INTERVAL_MS));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("esp32-ada-pump ist Firmware; für ein ESP32-Target bauen (cargo build --target riscv32imc-esp-espidf).");
}
