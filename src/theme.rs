//! Colours for the terminal display.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color gradient with 2-3 stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Gradient color stops.
    pub stops: Vec<String>,
}

impl Gradient {
    /// Creates a two-color gradient.
    #[must_use]
    pub fn two(start: &str, end: &str) -> Self {
        Self { stops: vec![start.to_string(), end.to_string()] }
    }

    /// Creates a three-color gradient.
    #[must_use]
    pub fn three(start: &str, mid: &str, end: &str) -> Self {
        Self { stops: vec![start.to_string(), mid.to_string(), end.to_string()] }
    }

    /// Samples the gradient at position t (0.0 - 1.0).
    #[must_use]
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

        if self.stops.is_empty() {
            return Color::White;
        }

        if self.stops.len() == 1 {
            return parse_color(&self.stops[0]);
        }

        let segment_count = self.stops.len() - 1;
        let segment_size = 1.0 / segment_count as f64;
        let segment = ((t / segment_size) as usize).min(segment_count - 1);
        let local_t = (t - segment as f64 * segment_size) / segment_size;

        let start = parse_color(&self.stops[segment]);
        let end = parse_color(&self.stops[segment + 1]);

        interpolate_color(start, end, local_t)
    }

    /// Samples a value in `[-1, +1]`, mapping `-1` to the first stop.
    #[must_use]
    pub fn sample_signed(&self, value: f64) -> Color {
        self.sample((value + 1.0) / 2.0)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::three("#7aa2f7", "#9ece6a", "#f7768e")
    }
}

/// Display theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Section title colour.
    #[serde(default = "default_title")]
    pub title: String,

    /// Row label colour.
    #[serde(default = "default_label")]
    pub label: String,

    /// Gradient for normalized values, from -1 to +1.
    #[serde(default)]
    pub normalized: Gradient,
}

fn default_title() -> String {
    "#7dcfff".to_string()
}
fn default_label() -> String {
    "#c0caf5".to_string()
}

impl Default for Theme {
    fn default() -> Self {
        Self { title: default_title(), label: default_label(), normalized: Gradient::default() }
    }
}

impl Theme {
    /// Returns the title colour.
    #[must_use]
    pub fn title(&self) -> Color {
        parse_color(&self.title)
    }

    /// Returns the label colour.
    #[must_use]
    pub fn label(&self) -> Color {
        parse_color(&self.label)
    }
}

/// Parses a hex color string to a ratatui Color.
fn parse_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 || !hex.is_ascii() {
        return Color::White;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

    Color::Rgb(r, g, b)
}

fn interpolate_color(start: Color, end: Color, t: f64) -> Color {
    let (r1, g1, b1) = color_to_rgb(start);
    let (r2, g2, b2) = color_to_rgb(end);

    let r = ((1.0 - t) * r1 as f64 + t * r2 as f64) as u8;
    let g = ((1.0 - t) * g1 as f64 + t * g2 as f64) as u8;
    let b = ((1.0 - t) * b1 as f64 + t * b2 as f64) as u8;

    Color::Rgb(r, g, b)
}

fn color_to_rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        _ => (255, 255, 255),
    }
}
