// units.rs
use embedded_hal::digital::InputPin;
use esp_idf_svc::nvs::{EspNvs, NvsDefault};
use log::{error, info};

/// NVS key holding the persisted unit byte (0 = metric, 1 = imperial).
const UNITS_KEY: &str = "units";

/// Unit system for both the API query and the panel formatting.
/// Selected once at startup, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units=` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temp_suffix(self) -> &'static str {
        match self {
            Units::Metric => "\u{00b0}C",
            Units::Imperial => "\u{00b0}F",
        }
    }

    pub fn from_byte(b: u8) -> Self {
        if b == 1 {
            Units::Imperial
        } else {
            Units::Metric
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Units::Metric => 0,
            Units::Imperial => 1,
        }
    }
}

/// One byte of non-volatile storage for the unit preference.
pub trait UnitStore {
    fn load(&mut self) -> Option<u8>;
    fn save(&mut self, value: u8);
}

/// Unit byte stored in the default NVS partition. Read and write errors are
/// logged and otherwise ignored: a missing byte is the normal first-boot case.
pub struct NvsUnitStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsUnitStore {
    pub fn new(nvs: EspNvs<NvsDefault>) -> Self {
        Self { nvs }
    }
}

impl UnitStore for NvsUnitStore {
    fn load(&mut self) -> Option<u8> {
        match self.nvs.get_u8(UNITS_KEY) {
            Ok(v) => v,
            Err(e) => {
                error!("NVS read error for {}: {:?}", UNITS_KEY, e);
                None
            }
        }
    }

    fn save(&mut self, value: u8) {
        if let Err(e) = self.nvs.set_u8(UNITS_KEY, value) {
            error!("NVS write error for {}: {:?}", UNITS_KEY, e);
        }
    }
}

/// Hardware input that picks the unit system, chosen once at startup.
///
/// A strap jumper is read directly and needs no persistence. A button pair is
/// sampled once: a held button overwrites the stored byte, otherwise the byte
/// from the previous boot is reused. With no input hardware the default is
/// metric. Absent hardware or unreadable pins are normal, not errors.
pub enum UnitSelect<P> {
    /// Strap pin with a pull-up: open (high) = imperial, bridged = metric.
    Jumper(P),
    /// Active-low momentary buttons, sampled once at boot.
    Buttons { down: P, up: P },
    /// No unit hardware on this board.
    Fixed(Units),
}

impl<P: InputPin> UnitSelect<P> {
    /// Read the hardware once and return the unit system for this run,
    /// persisting a button choice for the next boot.
    pub fn resolve(self, store: &mut dyn UnitStore) -> Units {
        let units = match self {
            UnitSelect::Jumper(mut pin) => {
                if pin.is_high().unwrap_or(false) {
                    Units::Imperial
                } else {
                    Units::Metric
                }
            }
            UnitSelect::Buttons { mut down, mut up } => {
                if down.is_low().unwrap_or(false) {
                    info!("Down button held, storing imperial");
                    store.save(Units::Imperial.as_byte());
                    Units::Imperial
                } else if up.is_low().unwrap_or(false) {
                    info!("Up button held, storing metric");
                    store.save(Units::Metric.as_byte());
                    Units::Metric
                } else {
                    Units::from_byte(store.load().unwrap_or(0))
                }
            }
            UnitSelect::Fixed(units) => units,
        };
        info!("Unit system: {}", units.query_value());
        units
    }
}
