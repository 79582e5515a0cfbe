//! Bipolar meter widget.
//!
//! Draws a horizontal bar centred on zero. Negative values fill to the left
//! of the centre, positive values to the right.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// A horizontal meter for values in `[-1, +1]`.
#[derive(Debug, Clone)]
pub struct BipolarMeter {
    /// Value between -1.0 and 1.0.
    value: f64,
    /// Optional label to display.
    label: Option<String>,
    /// Color for the filled portion.
    color: Color,
    /// Whether to show the numeric value.
    show_value: bool,
}

impl BipolarMeter {
    /// Creates a new meter. Out-of-range values are clamped, NaN reads as 0.
    #[must_use]
    pub fn new(value: f64) -> Self {
        let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        Self { value, label: None, color: Color::Green, show_value: true }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets whether to show the value.
    #[must_use]
    pub fn show_value(mut self, show: bool) -> Self {
        self.show_value = show;
        self
    }

    /// Cell range `[start, end)` filled for a bar of `width` cells.
    fn filled_span(&self, width: u16) -> (u16, u16) {
        if width == 0 {
            return (0, 0);
        }
        let center = width / 2;
        let half = f64::from(width) / 2.0;
        let reach = (self.value.abs() * half).round() as u16;
        if self.value < 0.0 {
            (center.saturating_sub(reach), center)
        } else {
            (center, (center + reach).min(width))
        }
    }
}

impl Widget for BipolarMeter {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let label_width = self.label.as_ref().map_or(0, |l| l.chars().count() + 1) as u16;
        let value_width = if self.show_value { 7 } else { 0 }; // " -1.00"
        let bar_width = area.width.saturating_sub(label_width + value_width);
        let right = area.right();

        let mut x = area.x;

        if let Some(label) = &self.label {
            buf.set_stringn(x, area.y, label, usize::from(area.width), Style::default());
            x = x.saturating_add(label_width).min(right);
        }

        let (start, end) = self.filled_span(bar_width);
        let center = bar_width / 2;
        for i in 0..bar_width {
            let (symbol, style) = if i >= start && i < end {
                ("█", Style::default().fg(self.color))
            } else if i == center {
                ("┃", Style::default().fg(Color::Gray))
            } else {
                ("░", Style::default().fg(Color::DarkGray))
            };
            buf.set_string(x + i, area.y, symbol, style);
        }

        let value_x = x + bar_width + 1;
        if self.show_value && value_x < right {
            let text = format!("{:+.2}", self.value);
            buf.set_stringn(value_x, area.y, text, usize::from(right - value_x), Style::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render_line(meter: BipolarMeter, width: u16) -> String {
        let backend = TestBackend::new(width, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| frame.render_widget(meter, frame.area())).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol().to_string()).collect()
    }

    #[test]
    fn test_meter_clamps_value() {
        assert_eq!(BipolarMeter::new(3.0).value, 1.0);
        assert_eq!(BipolarMeter::new(-250.0).value, -1.0);
        assert_eq!(BipolarMeter::new(f64::NAN).value, 0.0);
    }

    #[test]
    fn test_filled_span() {
        assert_eq!(BipolarMeter::new(0.0).filled_span(10), (5, 5));
        assert_eq!(BipolarMeter::new(1.0).filled_span(10), (5, 10));
        assert_eq!(BipolarMeter::new(-1.0).filled_span(10), (0, 5));
        assert_eq!(BipolarMeter::new(0.5).filled_span(10), (5, 8));
        assert_eq!(BipolarMeter::new(0.3).filled_span(0), (0, 0));
    }

    #[test]
    fn test_builder() {
        let meter = BipolarMeter::new(0.25).label("X").color(Color::Red).show_value(false);

        assert_eq!(meter.label, Some("X".to_string()));
        assert_eq!(meter.color, Color::Red);
        assert!(!meter.show_value);
    }

    #[test]
    fn test_negative_fills_left_of_centre() {
        let line = render_line(BipolarMeter::new(-1.0).show_value(false), 10);
        assert_eq!(line, "█████┃░░░░");
    }

    #[test]
    fn test_narrow_area_stays_inside() {
        let backend = TestBackend::new(12, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = Rect { width: 4, ..frame.area() };
                frame.render_widget(BipolarMeter::new(-0.75).label("X"), area);
            })
            .unwrap();

        let cells = terminal.backend().buffer().content();
        assert_eq!(cells[0].symbol(), "X");
        for (i, cell) in cells.iter().enumerate().skip(4) {
            assert_eq!(cell.symbol(), " ", "cell {i} written outside the area");
        }
    }

    #[test]
    fn test_renders_label_and_value() {
        let line = render_line(BipolarMeter::new(0.5).label("Z"), 30);

        assert!(line.starts_with("Z "), "{line}");
        assert!(line.contains("+0.50"), "{line}");
        assert!(line.contains('█'), "{line}");
    }
}
