//! Display sinks.
//!
//! The sampling loop hands a [`ChannelTable`] to a [`DisplaySink`] once per
//! iteration and expects nothing back. [`TerminalDisplay`] draws the table
//! with ratatui; [`HeadlessDisplay`] only counts frames.

use crate::channel::{ChannelId, ChannelState, ChannelTable, SensorGroup};
use crate::config::DisplayConfig;
use crate::controller::Phase;
use crate::error::Result;
use crate::temperature::TempScale;
use crate::theme::Theme;
use crate::widgets::BipolarMeter;

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io::{self, stdout, Stdout};

/// Consumer of conditioned channel values.
pub trait DisplaySink {
    /// Renders one snapshot. Failures are the sink's own business.
    fn render(&mut self, channels: &ChannelTable);

    /// Releases whatever the sink holds. Called once during shutdown.
    fn close(&mut self) {}

    /// Notified on every loop phase transition, before the phase's work.
    fn on_phase(&mut self, _phase: Phase) {}
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn render(&mut self, channels: &ChannelTable) {
        (**self).render(channels);
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn on_phase(&mut self, phase: Phase) {
        (**self).on_phase(phase);
    }
}

/// Rows per sensor block: five value rows, an optional meter row, borders.
fn block_height(config: &DisplayConfig) -> u16 {
    5 + u16::from(config.show_meters) + 2
}

/// Draws every channel into `area`.
pub fn draw_channels(frame: &mut Frame, area: Rect, channels: &ChannelTable, config: &DisplayConfig) {
    let height = block_height(config);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(height),
            Constraint::Length(height),
            Constraint::Length(height),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    for (group, chunk) in SensorGroup::ALL.into_iter().zip(chunks.iter()) {
        draw_group(frame, *chunk, group, channels, config);
    }
    draw_temperature(frame, chunks[3], channels.get(ChannelId::Temperature), config);
}

fn titled_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.title()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
}

fn label(text: &str, theme: &Theme) -> Span<'static> {
    Span::styled(format!("{text:>12}: "), Style::default().fg(theme.label()))
}

fn xyz_line(name: &str, values: [String; 3], theme: &Theme) -> Line<'static> {
    let [x, y, z] = values;
    Line::from(vec![label(name, theme), Span::raw(format!("{x:>9} X {y:>9} Y {z:>9} Z"))])
}

fn draw_group(
    frame: &mut Frame,
    area: Rect,
    group: SensorGroup,
    channels: &ChannelTable,
    config: &DisplayConfig,
) {
    let theme = &config.theme;
    let axes = channels.axes(group);
    let fmt = |f: fn(&ChannelState) -> f64| axes.map(|c| format!("{:.1}", f(c)));

    let normalized_spans: Vec<Span> = std::iter::once(label("Normalized", theme))
        .chain(axes.iter().zip(["X", "Y", "Z"]).flat_map(|(c, axis)| {
            [
                Span::styled(
                    format!("{:>9.2}", c.normalized),
                    Style::default().fg(theme.normalized.sample_signed(c.normalized)),
                ),
                Span::raw(format!(" {axis} ")),
            ]
        }))
        .collect();

    let lines = vec![
        xyz_line("Raw", axes.map(|c| c.raw.to_string()), theme),
        xyz_line("Smoothed", fmt(|c| c.smoothed), theme),
        xyz_line("Min", fmt(|c| c.min), theme),
        xyz_line("Max", fmt(|c| c.max), theme),
        Line::from(normalized_spans),
    ];

    let block = titled_block(group.label(), theme);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if config.show_meters && inner.height > 5 {
        let row = Rect { y: inner.y + 5, height: 1, ..inner };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(row);
        for ((state, axis), cell) in axes.iter().zip(["X", "Y", "Z"]).zip(cells.iter()) {
            let meter = BipolarMeter::new(state.normalized)
                .label(axis)
                .color(theme.normalized.sample_signed(state.normalized));
            frame.render_widget(meter, *cell);
        }
    }
}

fn draw_temperature(frame: &mut Frame, area: Rect, state: &ChannelState, config: &DisplayConfig) {
    let theme = &config.theme;
    let scale: TempScale = config.temperature_scale;
    let suffix = scale.suffix();
    let row = |name: &str, raw: String, value: f64| {
        Line::from(vec![
            label(name, theme),
            Span::raw(format!("{raw:>9} {:>8.1} {suffix}", scale.from_raw(value))),
        ])
    };

    let lines = vec![
        row("Raw", state.raw.to_string(), f64::from(state.raw)),
        row("Smoothed", format!("{:.1}", state.smoothed), state.smoothed),
        row("Min", format!("{:.1}", state.min), state.min),
        row("Max", format!("{:.1}", state.max), state.max),
        Line::from(vec![
            label("Normalized", theme),
            Span::styled(
                format!("{:>9.2}", state.normalized),
                Style::default().fg(theme.normalized.sample_signed(state.normalized)),
            ),
        ]),
    ];

    let block = titled_block("Temperature", theme);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if config.show_meters && inner.height > 5 {
        let row = Rect { y: inner.y + 5, height: 1, width: inner.width / 3, ..inner };
        let meter = BipolarMeter::new(state.normalized)
            .label("T")
            .color(theme.normalized.sample_signed(state.normalized));
        frame.render_widget(meter, row);
    }
}

/// Clears local echo, leaving ISIG and canonical input alone.
#[cfg(unix)]
fn without_echo(mut modes: libc::termios) -> libc::termios {
    modes.c_lflag &= !(libc::ECHO | libc::ECHONL);
    modes
}

/// Stdin terminal modes saved before echo was switched off.
#[cfg(unix)]
struct EchoGuard {
    saved: libc::termios,
}

#[cfg(unix)]
impl EchoGuard {
    /// Turns echo off on stdin. `None` when stdin is not a terminal.
    #[allow(unsafe_code)]
    fn disable() -> Option<Self> {
        // SAFETY: `termios` is plain data, filled by tcgetattr before it is
        // read. Both calls only touch stdin's line discipline.
        unsafe {
            if libc::isatty(libc::STDIN_FILENO) == 0 {
                return None;
            }
            let mut saved: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &mut saved) != 0 {
                return None;
            }
            let quiet = without_echo(saved);
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &quiet) != 0 {
                return None;
            }
            Some(Self { saved })
        }
    }

    #[allow(unsafe_code)]
    fn restore(&self) -> io::Result<()> {
        // SAFETY: `saved` came from tcgetattr on the same descriptor.
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.saved) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
struct EchoGuard;

#[cfg(not(unix))]
impl EchoGuard {
    fn disable() -> Option<Self> {
        None
    }

    fn restore(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Full-screen terminal display.
///
/// Uses the alternate screen with echo off but without raw mode, so typed
/// keys stay off the screen while Ctrl+C still reaches the process as SIGINT.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    config: DisplayConfig,
    echo: Option<EchoGuard>,
    closed: bool,
}

impl TerminalDisplay {
    /// Switches the terminal to the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: DisplayConfig) -> Result<Self> {
        let echo = EchoGuard::disable();
        if echo.is_none() {
            crate::debug!("display", "stdin is not a terminal, echo left as is");
        }
        stdout().execute(EnterAlternateScreen)?.execute(Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal, config, echo, closed: false })
    }

    fn restore(&mut self) -> io::Result<()> {
        self.closed = true;
        if let Some(echo) = self.echo.take() {
            if let Err(e) = echo.restore() {
                crate::error!("display", "failed to restore echo: {e}");
            }
        }
        stdout().execute(LeaveAlternateScreen)?.execute(Show)?;
        Ok(())
    }
}

impl DisplaySink for TerminalDisplay {
    fn render(&mut self, channels: &ChannelTable) {
        let config = &self.config;
        if let Err(e) = self.terminal.draw(|frame| {
            let area = frame.area();
            draw_channels(frame, area, channels, config);
        }) {
            crate::error!("display", "render failed: {e}");
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.restore() {
            crate::error!("display", "failed to restore terminal: {e}");
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sink that renders nothing and remembers the last snapshot.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    frames: u64,
    last: Option<ChannelTable>,
}

impl HeadlessDisplay {
    /// Creates an empty headless sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots received.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&ChannelTable> {
        self.last.as_ref()
    }
}

impl DisplaySink for HeadlessDisplay {
    fn render(&mut self, channels: &ChannelTable) {
        self.frames += 1;
        self.last = Some(*channels);
    }
}
