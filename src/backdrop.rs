//! Background image behind the stopwatch panel.
//!
//! The image is fetched once, before the terminal UI starts. Any failure is
//! logged and replaced with a solid fill; nothing else depends on it.

use image::imageops::FilterType;
use image::RgbImage;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use thiserror::Error;

use crate::config::BackdropConfig;

const UPPER_HALF_BLOCK: &str = "\u{2580}";

#[derive(Debug, Error)]
pub enum BackdropError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub struct Backdrop {
    source: Option<RgbImage>,
    fallback: Color,
    /// `source` resized to the last area, two pixel rows per terminal row.
    fitted: Option<RgbImage>,
}

impl Backdrop {
    pub fn solid(fallback: Color) -> Self {
        Self {
            source: None,
            fallback,
            fitted: None,
        }
    }

    pub fn from_image(image: RgbImage, fallback: Color) -> Self {
        Self {
            source: Some(image),
            fallback,
            fitted: None,
        }
    }

    /// One bounded attempt to download the configured image.
    pub fn fetch(config: &BackdropConfig) -> Self {
        match download(config) {
            Ok(image) => {
                log::info!(
                    "Backdrop loaded: {}x{} from {}",
                    image.width(),
                    image.height(),
                    config.url
                );
                Self::from_image(image, config.fallback)
            }
            Err(e) => {
                log::warn!("Could not download background image: {}", e);
                Self::solid(config.fallback)
            }
        }
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    /// Rescales the image for `area` if its size changed since the last call.
    pub fn fit(&mut self, area: Rect) {
        let Some(source) = &self.source else {
            return;
        };
        let (w, h) = (area.width as u32, area.height as u32 * 2);
        if w == 0 || h == 0 {
            return;
        }
        let stale = self
            .fitted
            .as_ref()
            .map(|f| f.dimensions() != (w, h))
            .unwrap_or(true);
        if stale {
            self.fitted = Some(image::imageops::resize(source, w, h, FilterType::Triangle));
        }
    }
}

fn download(config: &BackdropConfig) -> Result<RgbImage, BackdropError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .build()?;
    let bytes = client.get(&config.url).send()?.error_for_status()?.bytes()?;
    decode(&bytes)
}

pub fn decode(bytes: &[u8]) -> Result<RgbImage, BackdropError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Mixes `over` onto `under`. Non-RGB colors are left to `over`.
pub fn blend(under: Color, over: Color, opacity: f32) -> Color {
    match (under, over) {
        (Color::Rgb(ur, ug, ub), Color::Rgb(or, og, ob)) => {
            let a = opacity.clamp(0.0, 1.0);
            let mix = |u: u8, o: u8| (o as f32 * a + u as f32 * (1.0 - a)).round() as u8;
            Color::Rgb(mix(ur, or), mix(ug, og), mix(ub, ob))
        }
        _ => over,
    }
}

/// Frosts `area` of an already drawn backdrop with `color`.
pub fn frost(buf: &mut Buffer, area: Rect, color: Color, opacity: f32) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                // Half blocks carry two colors; average them before mixing.
                let under = match (cell.fg, cell.bg) {
                    (Color::Rgb(tr, tg, tb), Color::Rgb(br, bg, bb)) => Color::Rgb(
                        ((tr as u16 + br as u16) / 2) as u8,
                        ((tg as u16 + bg as u16) / 2) as u8,
                        ((tb as u16 + bb as u16) / 2) as u8,
                    ),
                    (_, bg) => bg,
                };
                cell.set_symbol(" ");
                cell.set_bg(blend(under, color, opacity));
            }
        }
    }
}

fn rgb(pixel: &image::Rgb<u8>) -> Color {
    let [r, g, b] = pixel.0;
    Color::Rgb(r, g, b)
}

impl Widget for &Backdrop {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fitted = self
            .fitted
            .as_ref()
            .filter(|f| f.dimensions() == (area.width as u32, area.height as u32 * 2));
        let Some(fitted) = fitted else {
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_symbol(" ");
                        cell.set_fg(self.fallback);
                        cell.set_bg(self.fallback);
                    }
                }
            }
            return;
        };
        for row in 0..area.height {
            for col in 0..area.width {
                let top = fitted.get_pixel(col as u32, row as u32 * 2);
                let bottom = fitted.get_pixel(col as u32, row as u32 * 2 + 1);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(UPPER_HALF_BLOCK);
                    cell.set_fg(rgb(top));
                    cell.set_bg(rgb(bottom));
                }
            }
        }
    }
}
