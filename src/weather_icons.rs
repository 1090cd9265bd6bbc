// weather_icons.rs
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// Icon edge length in pixels. Bitmaps are 1 bit per pixel, row-major,
/// 2 bytes per row, MSB first.
pub const ICON_SIZE: usize = 16;

#[rustfmt::skip]
static ICON_SUN: [u8; 32] = [
    0b0000_0001, 0b1000_0000,
    0b0000_0001, 0b1000_0000,
    0b0010_0000, 0b0000_0100,
    0b0001_0011, 0b1100_1000,
    0b0000_0111, 0b1110_0000,
    0b0000_1111, 0b1111_0000,
    0b0000_1111, 0b1111_0000,
    0b1100_1111, 0b1111_0011,
    0b1100_1111, 0b1111_0011,
    0b0000_1111, 0b1111_0000,
    0b0000_1111, 0b1111_0000,
    0b0000_0111, 0b1110_0000,
    0b0001_0011, 0b1100_1000,
    0b0010_0000, 0b0000_0100,
    0b0000_0001, 0b1000_0000,
    0b0000_0001, 0b1000_0000,
];

#[rustfmt::skip]
static ICON_MOON: [u8; 32] = [
    0b0000_0111, 0b1110_0000,
    0b0001_1111, 0b1100_0000,
    0b0011_1111, 0b0000_0000,
    0b0111_1110, 0b0000_0000,
    0b0111_1100, 0b0000_0000,
    0b1111_1100, 0b0000_0000,
    0b1111_1100, 0b0000_0000,
    0b1111_1100, 0b0000_0000,
    0b1111_1100, 0b0000_0000,
    0b1111_1100, 0b0000_0000,
    0b0111_1100, 0b0000_0000,
    0b0111_1110, 0b0000_0000,
    0b0011_1111, 0b0000_0000,
    0b0001_1111, 0b1100_0000,
    0b0000_0111, 0b1110_0000,
    0b0000_0000, 0b0000_0000,
];

#[rustfmt::skip]
static ICON_PARTLY: [u8; 32] = [
    0b0000_0001, 0b1110_0000,
    0b0000_0011, 0b1111_0000,
    0b0000_0111, 0b1111_1000,
    0b0000_0111, 0b1111_1000,
    0b0000_0011, 0b1111_0000,
    0b0000_0001, 0b1110_0000,
    0b0000_1111, 0b0000_0000,
    0b0001_1111, 0b1000_0000,
    0b0111_1111, 0b1110_0000,
    0b1111_1111, 0b1111_1000,
    0b1111_1111, 0b1111_1100,
    0b1111_1111, 0b1111_1100,
    0b0111_1111, 0b1111_1000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
];

#[rustfmt::skip]
static ICON_CLOUD: [u8; 32] = [
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0111, 0b1000_0000,
    0b0000_1111, 0b1100_0000,
    0b0011_1111, 0b1110_0000,
    0b0111_1111, 0b1111_0000,
    0b1111_1111, 0b1111_1100,
    0b1111_1111, 0b1111_1110,
    0b1111_1111, 0b1111_1110,
    0b0111_1111, 0b1111_1100,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
];

#[rustfmt::skip]
static ICON_RAIN: [u8; 32] = [
    0b0000_0000, 0b0000_0000,
    0b0000_0111, 0b1000_0000,
    0b0000_1111, 0b1100_0000,
    0b0011_1111, 0b1110_0000,
    0b0111_1111, 0b1111_0000,
    0b1111_1111, 0b1111_1100,
    0b1111_1111, 0b1111_1110,
    0b0111_1111, 0b1111_1100,
    0b0000_0000, 0b0000_0000,
    0b0100_1001, 0b0010_0100,
    0b0100_1001, 0b0010_0100,
    0b0000_0000, 0b0000_0000,
    0b0010_0100, 0b1001_0010,
    0b0010_0100, 0b1001_0010,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
];

#[rustfmt::skip]
static ICON_STORM: [u8; 32] = [
    0b0000_0111, 0b1000_0000,
    0b0000_1111, 0b1100_0000,
    0b0011_1111, 0b1110_0000,
    0b0111_1111, 0b1111_0000,
    0b1111_1111, 0b1111_1100,
    0b1111_1111, 0b1111_1110,
    0b0111_1111, 0b1111_1100,
    0b0000_0011, 0b1000_0000,
    0b0000_0111, 0b0000_0000,
    0b0000_1110, 0b0000_0000,
    0b0001_1111, 0b1100_0000,
    0b0000_0011, 0b1000_0000,
    0b0000_0111, 0b0000_0000,
    0b0000_1110, 0b0000_0000,
    0b0000_1100, 0b0000_0000,
    0b0000_1000, 0b0000_0000,
];

#[rustfmt::skip]
static ICON_SNOW: [u8; 32] = [
    0b0000_0001, 0b1000_0000,
    0b0000_0001, 0b1000_0000,
    0b0010_0001, 0b1000_0100,
    0b0001_0001, 0b1000_1000,
    0b0000_1001, 0b1001_0000,
    0b0000_0101, 0b1010_0000,
    0b0000_0011, 0b1100_0000,
    0b0111_1111, 0b1111_1110,
    0b0111_1111, 0b1111_1110,
    0b0000_0011, 0b1100_0000,
    0b0000_0101, 0b1010_0000,
    0b0000_1001, 0b1001_0000,
    0b0001_0001, 0b1000_1000,
    0b0010_0001, 0b1000_0100,
    0b0000_0001, 0b1000_0000,
    0b0000_0001, 0b1000_0000,
];

#[rustfmt::skip]
static ICON_MIST: [u8; 32] = [
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0111_1011, 0b1101_1110,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b1111_0111, 0b1011_1101,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0111_1011, 0b1101_1110,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b1111_0111, 0b1011_1101,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
    0b0000_0000, 0b0000_0000,
];

/// Bitmap for an OpenWeatherMap icon code, or None for codes without one
/// (the renderer then omits the icon; the description strip still runs).
pub fn get_weather_icon(icon_code: &str) -> Option<&'static [u8; 32]> {
    match icon_code {
        "01d" => Some(&ICON_SUN),
        "01n" => Some(&ICON_MOON),
        "02d" => Some(&ICON_PARTLY),
        "02n" | "03d" | "03n" | "04d" | "04n" => Some(&ICON_CLOUD),
        "09d" | "09n" | "10d" | "10n" => Some(&ICON_RAIN),
        "11d" | "11n" => Some(&ICON_STORM),
        "13d" | "13n" => Some(&ICON_SNOW),
        "50d" | "50n" => Some(&ICON_MIST),
        _ => None,
    }
}

/// Tint for the icon, by condition class.
pub fn icon_color(icon_code: &str) -> Rgb565 {
    match icon_code.get(..2) {
        Some("01") | Some("02") | Some("11") => Rgb565::YELLOW, // sun / lightning
        Some("09") | Some("10") => Rgb565::BLUE,                // rain
        Some("13") => Rgb565::WHITE,                            // snow
        Some("03") | Some("04") | Some("50") => Rgb565::CSS_GRAY, // clouds / mist
        _ => Rgb565::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_bitmaps() {
        for code in [
            "01d", "01n", "02d", "02n", "03d", "03n", "04d", "04n", "09d", "09n", "10d",
            "10n", "11d", "11n", "13d", "13n", "50d", "50n",
        ] {
            let icon = get_weather_icon(code).unwrap();
            // Every bitmap draws something.
            assert!(icon.iter().any(|&b| b != 0), "blank icon for {}", code);
        }
    }

    #[test]
    fn unknown_codes_have_no_bitmap() {
        assert!(get_weather_icon("99x").is_none());
        assert!(get_weather_icon("").is_none());
    }

    #[test]
    fn tint_ignores_short_codes() {
        assert_eq!(icon_color(""), Rgb565::WHITE);
        assert_eq!(icon_color("13d"), Rgb565::WHITE);
        assert_eq!(icon_color("09n"), Rgb565::BLUE);
    }
}
