// graphics.rs
use embedded_graphics::{
    mono_font::{ascii::FONT_4X6, ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
    text::Text,
};
use embedded_graphics_framebuf::FrameBuf;
use profont::PROFONT_12_POINT;

use crate::scheduler::WeatherPanel;
use crate::time_utils::{self, LocalTime};
use crate::units::Units;
use crate::weather::WeatherReport;
use crate::weather_icons::{get_weather_icon, icon_color, ICON_SIZE};

/// Logical panel resolution.
pub const MATRIX_WIDTH: usize = 64;
pub const MATRIX_HEIGHT: usize = 32;

// Layout: clock across the top, temperature left and icon right in the
// middle band, scrolling condition text along the bottom rows.
const CLOCK_POS: Point = Point::new(1, 6);
const TEMP_POS: Point = Point::new(1, 21);
const ICON_POS: Point = Point::new(46, 7);
const STRIP_TOP: i32 = 25;
const STRIP_BASELINE: i32 = 30;

/// Advance per glyph of FONT_4X6, used to size the marquee.
const SCROLL_CHAR_WIDTH: i32 = 4;

const CLOCK_COLOR: Rgb565 = Rgb565::WHITE;
const TEMP_COLOR: Rgb565 = Rgb565::YELLOW;
const STRIP_COLOR: Rgb565 = Rgb565::CYAN;

/// Marquee state for the bottom label strip. Text that fits the panel is
/// centered and pinned; longer text enters from the right edge and wraps.
struct ScrollLabel {
    text: String,
    offset: i32,
}

impl ScrollLabel {
    fn new() -> Self {
        Self {
            text: String::new(),
            offset: 0,
        }
    }

    fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.offset = MATRIX_WIDTH as i32;
        }
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn width(&self) -> i32 {
        self.text.len() as i32 * SCROLL_CHAR_WIDTH
    }

    /// Nothing to animate: no text, or text that fits the panel.
    fn is_static(&self) -> bool {
        self.text.is_empty() || self.width() <= MATRIX_WIDTH as i32
    }

    fn step(&mut self) {
        if self.is_static() {
            return;
        }
        self.offset -= 1;
        if self.offset < -self.width() {
            self.offset = MATRIX_WIDTH as i32;
        }
    }

    fn x(&self) -> i32 {
        if self.is_static() {
            (MATRIX_WIDTH as i32 - self.width()) / 2
        } else {
            self.offset
        }
    }
}

/// Composes the 64x32 frame in memory and blits it wholesale to the panel,
/// so the matrix never shows a partially drawn state.
pub struct MatrixGraphics<D> {
    panel: D,
    buf: [Rgb565; MATRIX_WIDTH * MATRIX_HEIGHT],
    am_pm: bool,
    units: Units,
    scroll: ScrollLabel,
}

impl<D> MatrixGraphics<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(panel: D, am_pm: bool, units: Units) -> Self {
        Self {
            panel,
            buf: [Rgb565::BLACK; MATRIX_WIDTH * MATRIX_HEIGHT],
            am_pm,
            units,
            scroll: ScrollLabel::new(),
        }
    }

    fn flush(&mut self) {
        let area = Rectangle::new(
            Point::zero(),
            Size::new(MATRIX_WIDTH as u32, MATRIX_HEIGHT as u32),
        );
        self.panel
            .fill_contiguous(&area, self.buf.iter().copied())
            .ok();
    }

    /// Redraw the bottom strip from the current scroll state.
    fn draw_strip(buf: &mut [Rgb565; MATRIX_WIDTH * MATRIX_HEIGHT], scroll: &ScrollLabel) {
        let mut frame = FrameBuf::new(buf, MATRIX_WIDTH, MATRIX_HEIGHT);
        let strip = Rectangle::new(
            Point::new(0, STRIP_TOP),
            Size::new(MATRIX_WIDTH as u32, (MATRIX_HEIGHT as i32 - STRIP_TOP) as u32),
        );
        frame.fill_solid(&strip, Rgb565::BLACK).ok();
        if !scroll.text.is_empty() {
            let style = MonoTextStyle::new(&FONT_4X6, STRIP_COLOR);
            Text::new(&scroll.text, Point::new(scroll.x(), STRIP_BASELINE), style)
                .draw(&mut frame)
                .ok();
        }
    }
}

impl<D> WeatherPanel for MatrixGraphics<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn render(&mut self, report: Option<&WeatherReport>, now: &LocalTime) {
        {
            let mut frame = FrameBuf::new(&mut self.buf, MATRIX_WIDTH, MATRIX_HEIGHT);
            frame.clear(Rgb565::BLACK).ok();

            let clock_style = MonoTextStyle::new(&FONT_5X8, CLOCK_COLOR);
            let clock_s = time_utils::format_clock(now.hour, now.minute, self.am_pm);
            Text::new(&clock_s, CLOCK_POS, clock_style).draw(&mut frame).ok();

            if let Some(report) = report {
                let temp_style = MonoTextStyle::new(&PROFONT_12_POINT, TEMP_COLOR);
                Text::new(&report.temp_label(self.units), TEMP_POS, temp_style)
                    .draw(&mut frame)
                    .ok();

                if let Some(code) = report.icon_code() {
                    if let Some(icon) = get_weather_icon(code) {
                        let color = icon_color(code);
                        // 1bpp bitmap, drawn pixel by pixel
                        for y in 0..ICON_SIZE {
                            for x in 0..ICON_SIZE {
                                let byte_index = y * (ICON_SIZE / 8) + (x / 8);
                                let bit_index = 7 - (x % 8);
                                if (icon[byte_index] >> bit_index) & 1 == 1 {
                                    Pixel(
                                        Point::new(
                                            ICON_POS.x + x as i32,
                                            ICON_POS.y + y as i32,
                                        ),
                                        color,
                                    )
                                    .draw(&mut frame)
                                    .ok();
                                }
                            }
                        }
                    }
                }

                self.scroll.set_text(report.condition().unwrap_or(""));
            }
        }

        Self::draw_strip(&mut self.buf, &self.scroll);
        self.flush();
    }

    fn blank(&mut self) {
        self.buf.fill(Rgb565::BLACK);
        // Keep the marquee quiet until the next daytime render reseeds it.
        self.scroll.clear();
        self.flush();
    }

    fn advance_scroll(&mut self) {
        if self.scroll.is_static() {
            return;
        }
        self.scroll.step();
        Self::draw_strip(&mut self.buf, &self.scroll);
        self.flush();
    }
}
