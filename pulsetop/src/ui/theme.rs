//! Shared UI theme constants.

use ratatui::style::Color;

pub const CPU_LINE: Color = Color::Rgb(62, 225, 177);
pub const MEM_LINE: Color = Color::Rgb(90, 169, 255);

pub const STATUS_LIVE: Color = Color::Rgb(62, 225, 177);
pub const STATUS_DOWN: Color = Color::Rgb(239, 83, 80);
pub const STATUS_WAIT: Color = Color::Rgb(255, 193, 7);

pub const MUTED: Color = Color::Rgb(140, 140, 150);

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);

pub fn load_color(pct: f64) -> Color {
    match pct {
        x if x < 25.0 => Color::Green,
        x if x < 60.0 => Color::Yellow,
        _ => Color::Red,
    }
}
