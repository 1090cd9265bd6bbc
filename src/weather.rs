// weather.rs
use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};
use serde::Deserialize;

use crate::scheduler::WeatherSource;
use crate::units::Units;

const HTTP_TIMEOUT_SECS: u64 = 30;
const BODY_LIMIT: usize = 16 * 1024;

// === OPENWEATHERMAP DATA STRUCTURES ===
// These structs match the JSON response from the OpenWeatherMap API.
// A payload missing any of these fields fails deserialization, which the
// scheduler treats like any other fetch failure.

#[derive(Deserialize, Debug, Clone)]
pub struct WeatherReport {
    #[serde(rename = "weather")]
    pub conditions: Vec<Condition>,
    pub main: Readings,
    pub wind: Wind,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Condition {
    pub description: String,
    pub icon: String, // e.g., "01d", "10n"
}

#[derive(Deserialize, Debug, Clone)]
pub struct Readings {
    pub temp: f32,
    pub humidity: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Wind {
    pub speed: f32,
}

impl WeatherReport {
    /// Temperature rounded for the panel, with the unit suffix.
    pub fn temp_label(&self, units: Units) -> String {
        format!("{:.0}{}", self.main.temp, units.temp_suffix())
    }

    /// Primary condition description, e.g. "scattered clouds".
    pub fn condition(&self) -> Option<&str> {
        self.conditions.first().map(|c| c.description.as_str())
    }

    /// Primary OWM icon code, e.g. "01d".
    pub fn icon_code(&self) -> Option<&str> {
        self.conditions.first().map(|c| c.icon.as_str())
    }
}

/// Build the query URL from the configured location, unit system and token.
pub fn build_url(city: &str, units: Units, api_key: &str) -> String {
    format!(
        "http://api.openweathermap.org/data/2.5/weather?q={}&units={}&appid={}",
        city,
        units.query_value(),
        api_key
    )
}

pub fn parse_report(json: &str) -> Result<WeatherReport> {
    let report: WeatherReport = serde_json::from_str(json)?;
    Ok(report)
}

// === HTTP GET ===
// Read the response in chunks; the ESP HTTP client does not hand over the
// whole body in one read.
fn http_get(url: &str) -> Result<String> {
    let connection = EspHttpConnection::new(&HttpConfiguration {
        timeout: Some(core::time::Duration::from_secs(HTTP_TIMEOUT_SECS)),
        ..Default::default()
    })?;
    let mut client = Client::wrap(connection);

    let request = client.get(url)?;
    let mut response = request.submit()?;

    let status = response.status();
    info!("Weather API response status: {}", status);
    if status != 200 {
        bail!("HTTP error: status {}", status);
    }

    let mut body: Vec<u8> = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
        if body.len() > BODY_LIMIT {
            bail!("Response too large (>{} bytes)", BODY_LIMIT);
        }
    }

    Ok(String::from_utf8(body)?)
}

/// Weather fetcher owning the Wi-Fi handle, so a dropped link is re-joined
/// before the next request.
pub struct OwmClient {
    wifi: BlockingWifi<EspWifi<'static>>,
    url: String,
}

impl OwmClient {
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>, city: &str, units: Units, api_key: &str) -> Self {
        Self {
            wifi,
            url: build_url(city, units, api_key),
        }
    }
}

impl WeatherSource for OwmClient {
    fn fetch(&mut self) -> Result<WeatherReport> {
        if !self.wifi.is_connected()? {
            warn!("WiFi disconnected, reconnecting...");
            self.wifi.connect()?;
            self.wifi.wait_netif_up()?;
        }

        let body = http_get(&self.url)?;
        parse_report(&body)
    }
}
