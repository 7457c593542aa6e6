use std::path::PathBuf;
use std::time::Duration;

use ratatui::style::Color;

const TICK_INTERVAL_MS: u64 = 50;
const IMAGE_URL: &str = "https://source.unsplash.com/random/500x600/?nature";
const FETCH_TIMEOUT_SECS: u64 = 5;
const LOG_FILE_NAME: &str = "stopwatch.log";

#[derive(Clone, Debug)]
pub struct BackdropConfig {
    pub url: String,
    pub timeout: Duration,
    pub fallback: Color,
}

#[derive(Clone, Debug)]
pub struct PanelStyle {
    pub width: u16,
    pub height: u16,
    pub color: Color,
    /// Share of the panel color in the blend; 1.0 hides the backdrop.
    pub opacity: f32,
    pub text: Color,
    pub start: Color,
    pub stop: Color,
    pub reset: Color,
    pub lap: Color,
    pub button_text: Color,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub tick_interval: Duration,
    pub backdrop: BackdropConfig,
    pub panel: PanelStyle,
    pub log_file: PathBuf,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            url: IMAGE_URL.to_string(),
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            fallback: Color::Rgb(0xf0, 0xf0, 0xf0),
        }
    }
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            width: 44,
            height: 22,
            color: Color::Rgb(0xdd, 0xdd, 0xdd),
            opacity: 0.8,
            text: Color::Rgb(0x33, 0x33, 0x33),
            start: Color::Rgb(0x4c, 0xaf, 0x50),
            stop: Color::Rgb(0xff, 0xa5, 0x00),
            reset: Color::Rgb(0xf4, 0x43, 0x36),
            lap: Color::Rgb(0x21, 0x96, 0xf3),
            button_text: Color::White,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            backdrop: BackdropConfig::default(),
            panel: PanelStyle::default(),
            log_file: std::env::temp_dir().join(LOG_FILE_NAME),
        }
    }
}
