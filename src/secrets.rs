// secrets.rs
use anyhow::{bail, Result};
use serde::Deserialize;

// Read secrets straight from the file at compile time
const SECRETS_TOML: &str = include_str!("../secrets.toml");

#[derive(Deserialize, Debug, Clone)]
pub struct Secrets {
    pub wifi: WiFiConfig,
    pub openweather: OpenWeatherConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WiFiConfig {
    pub ssid: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub city: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ClockConfig {
    pub am_pm: bool,
    pub utc_offset_hours: i32,
    pub eu_dst: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            am_pm: true,
            utc_offset_hours: 1,
            eu_dst: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub scroll_hold_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { scroll_hold_ms: 0 }
    }
}

impl Secrets {
    /// Loads the secrets embedded at compile time. Missing credentials are
    /// fatal: without a token and a city there is nothing to poll.
    pub fn load() -> Result<Self> {
        let secrets: Secrets = toml::from_str(SECRETS_TOML)
            .map_err(|e| anyhow::anyhow!("Error parsing secrets.toml: {}", e))?;

        if secrets.wifi.ssid.is_empty() {
            bail!("wifi.ssid is empty, set it in secrets.toml");
        }
        if secrets.openweather.api_key.is_empty() {
            bail!("openweather.api_key is empty, set it in secrets.toml");
        }
        if secrets.openweather.city.is_empty() {
            bail!("openweather.city is empty, set it in secrets.toml");
        }
        Ok(secrets)
    }
}
