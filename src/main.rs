// === IMPORTS ===
use core::ptr::addr_of_mut;
use std::time::Instant;

use embedded_hal::digital::OutputPin as OutputPinTrait;
use embedded_hal::spi::SpiDevice;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::{
    delay::FreeRtos,
    gpio::{AnyIOPin, InputPin, OutputPin, PinDriver, Pull},
    peripherals::Peripherals,
    prelude::*,
    spi::{config::Config, SpiDeviceDriver, SpiDriver, SpiDriverConfig},
};
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::*;
use mipidsi::{
    models::ST7789,
    options::{ColorInversion, ColorOrder},
    Builder,
};

mod clock;
mod graphics;
mod scheduler;
mod secrets;
mod time_utils;
mod units;
mod weather;
mod weather_icons;

use clock::SntpClock;
use graphics::MatrixGraphics;
use scheduler::Scheduler;
use secrets::Secrets;
use units::{NvsUnitStore, UnitSelect};
use weather::OwmClient;

// === PINS ===
// SPI panel wiring
const SPI_BAUDRATE_MHZ: u32 = 26;

// === CUSTOM ERROR TYPE ===
// Boilerplate for embedded-hal 1.0 compatibility
#[derive(Debug)]
struct PanelError;

impl embedded_hal::spi::Error for PanelError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

impl embedded_hal::digital::Error for PanelError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// === SPI WRAPPER ===
// Wraps the ESP-IDF SPI driver to implement the embedded-hal traits the
// display driver expects
struct SpiWrapper<'a> {
    spi: SpiDeviceDriver<'a, SpiDriver<'a>>,
}

impl embedded_hal::spi::ErrorType for SpiWrapper<'_> {
    type Error = PanelError;
}

impl SpiDevice for SpiWrapper<'_> {
    fn transaction(
        &mut self,
        operations: &mut [embedded_hal::spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                embedded_hal::spi::Operation::Write(data) => {
                    if !data.is_empty() {
                        self.spi.write(data).map_err(|_| PanelError)?;
                    }
                }
                embedded_hal::spi::Operation::Transfer(read, write) => {
                    if !write.is_empty() {
                        self.spi.transfer(read, write).map_err(|_| PanelError)?;
                    }
                }
                embedded_hal::spi::Operation::TransferInPlace(data) => {
                    if !data.is_empty() {
                        let temp = data.to_vec();
                        self.spi.transfer(data, &temp).map_err(|_| PanelError)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

// === DC PIN WRAPPER ===
struct DcPinWrapper<'a> {
    pin: PinDriver<'a, esp_idf_svc::hal::gpio::AnyOutputPin, esp_idf_svc::hal::gpio::Output>,
}

impl embedded_hal::digital::ErrorType for DcPinWrapper<'_> {
    type Error = PanelError;
}

impl OutputPinTrait for DcPinWrapper<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low().map_err(|_| PanelError)
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high().map_err(|_| PanelError)
    }
}

// === MAIN PROGRAM ===
fn main() -> anyhow::Result<()> {
    // Initialize system
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("=== Starting Matrix OpenWeather Display ===");

    // Missing credentials are fatal, everything later is retried forever.
    let secrets = Secrets::load()?;
    info!("Getting weather for {}", secrets.openweather.city);

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_default_partition = EspDefaultNvsPartition::take()?;

    // === UNIT SELECTION ===
    // One byte of NVS under our own namespace keeps the choice across boots.
    let unit_nvs = EspNvs::new(nvs_default_partition.clone(), "weather", true)?;
    let mut unit_store = NvsUnitStore::new(unit_nvs);

    #[cfg(feature = "unit-jumper")]
    let select = {
        let mut jumper = PinDriver::input(pins.gpio27.downgrade_input())?;
        jumper.set_pull(Pull::Up)?;
        UnitSelect::Jumper(jumper)
    };

    #[cfg(all(feature = "unit-buttons", not(feature = "unit-jumper")))]
    let select = {
        let mut down = PinDriver::input(pins.gpio32.downgrade_input())?;
        down.set_pull(Pull::Up)?;
        let mut up = PinDriver::input(pins.gpio33.downgrade_input())?;
        up.set_pull(Pull::Up)?;
        UnitSelect::Buttons { down, up }
    };

    #[cfg(not(any(feature = "unit-jumper", feature = "unit-buttons")))]
    let select: UnitSelect<
        PinDriver<'static, esp_idf_svc::hal::gpio::AnyInputPin, esp_idf_svc::hal::gpio::Input>,
    > = UnitSelect::Fixed(units::Units::Metric);

    let units = select.resolve(&mut unit_store);

    // === WiFi Setup ===
    info!("Starting WiFi...");
    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(
            peripherals.modem,
            sys_loop.clone(),
            Some(nvs_default_partition),
        )?,
        sys_loop,
    )?;

    let wifi_config = Configuration::Client(ClientConfiguration {
        ssid: secrets.wifi.ssid.as_str().try_into().unwrap(),
        password: secrets.wifi.password.as_str().try_into().unwrap(),
        auth_method: if secrets.wifi.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    });

    wifi.set_configuration(&wifi_config)?;
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("WiFi connected!");

    // SNTP runs in the background for as long as the clock handle lives;
    // the scheduler waits for the first sync on its first pass.
    let mut time_source = SntpClock::start(&secrets.clock)?;

    // ==================== DISPLAY SETUP ====================
    let sclk = pins.gpio18;
    let mosi = pins.gpio23;
    let cs = pins.gpio15;
    let dc = pins.gpio21;
    let mut rst = PinDriver::output(pins.gpio22)?;

    // Reset display
    rst.set_low()?;
    FreeRtos::delay_ms(50);
    rst.set_high()?;
    FreeRtos::delay_ms(200);

    // Initialize SPI
    let spi_config = Config::new().baudrate(SPI_BAUDRATE_MHZ.MHz().into());
    let spi_driver = SpiDriver::new(
        peripherals.spi2,
        sclk,
        mosi,
        None::<AnyIOPin>,
        &SpiDriverConfig::new(),
    )?;
    let spi_device = SpiDeviceDriver::new(spi_driver, Some(cs), &spi_config)?;

    // Create Wrappers
    let spi_wrapper = SpiWrapper { spi: spi_device };
    let dc_wrapper = DcPinWrapper {
        pin: PinDriver::output(dc.downgrade_output())?,
    };

    // Buffer allocation in static memory
    static mut DISPLAY_BUFFER: [u8; 64 * 32 * 2] = [0u8; 64 * 32 * 2];

    // Create Display Interface
    let di = unsafe {
        mipidsi::interface::SpiInterface::new(
            spi_wrapper,
            dc_wrapper,
            &mut *addr_of_mut!(DISPLAY_BUFFER),
        )
    };

    // Initialize Display Driver
    let display = Builder::new(ST7789, di)
        .display_size(240, 320)
        .display_offset(0, 0)
        .color_order(ColorOrder::Rgb)
        .invert_colors(ColorInversion::Inverted)
        .init(&mut FreeRtos)
        .map_err(|e| anyhow::anyhow!("Display init failed: {:?}", e))?;

    info!("Display initialized!");

    let mut panel = MatrixGraphics::new(display, secrets.clock.am_pm, units);
    let mut owm = OwmClient::new(
        wifi,
        &secrets.openweather.city,
        units,
        &secrets.openweather.api_key,
    );

    // ==================== MAIN LOOP ====================
    let scroll_hold_ms = secrets.display.scroll_hold_ms;
    let mut sched = Scheduler::new();
    info!("=== System Ready! ===");

    loop {
        match sched.tick(Instant::now(), &mut time_source, &mut owm, &mut panel) {
            // Pause between scroll steps
            Ok(()) => FreeRtos::delay_ms(scroll_hold_ms),
            // Any refresh error abandons the rest of the pass; the failed
            // activity is simply due again on the next one.
            Err(e) => error!("Some error occurred, retrying! - {:?}", e),
        }
    }
}
