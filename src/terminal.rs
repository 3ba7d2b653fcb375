use std::{
    collections::HashMap,
    io,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::supports_keyboard_enhancement,
    ExecutableCommand,
};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line, Rectangle},
        Block, BorderType, Borders, Paragraph,
    },
    DefaultTerminal,
};
use tracing::debug;

use crate::{
    config::Field,
    error::PongResult,
    input::{InputState, Key},
    render::{Painter, Surface},
    theme::ThemeColors,
};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(5);
// Without release events a key counts as held until its auto-repeat stops.
// Before the first repeat the window has to cover the OS repeat delay.
const FIRST_REPEAT_WINDOW: Duration = Duration::from_millis(750);
const REPEAT_WINDOW: Duration = Duration::from_millis(150);
const CONTROLS: &str = " ↑/↓ = move  |  B = bounding boxes  |  Esc/Q = quit ";

/// Draws frames into the terminal with a braille canvas scaled to the field.
pub struct TerminalSurface {
    terminal: DefaultTerminal,
    field: Field,
    colors: ThemeColors,
}

impl TerminalSurface {
    pub fn new(terminal: DefaultTerminal, field: Field, colors: ThemeColors) -> Self {
        Self {
            terminal,
            field,
            colors,
        }
    }
}

impl Surface for TerminalSurface {
    fn present(&mut self, scene: &dyn Fn(&mut dyn Painter)) -> PongResult<()> {
        let field = self.field;
        let colors = self.colors;

        self.terminal.draw(|frame| {
            let [game_area, controls_area] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(frame.area());

            let block = Block::default()
                .title(" terminal.pong ")
                .borders(Borders::ALL)
                .border_type(BorderType::Thick)
                .style(Style::default().fg(colors.border).bg(colors.background))
                .title_alignment(Alignment::Center);
            let inner = block.inner(game_area);
            frame.render_widget(block, game_area);

            let canvas = Canvas::default()
                .background_color(colors.background)
                .marker(Marker::Braille)
                .x_bounds([0.0, field.width as f64])
                .y_bounds([0.0, field.height as f64])
                .paint(|ctx| {
                    let mut painter = CanvasPainter::new(ctx, field, inner);
                    scene(&mut painter);
                });
            frame.render_widget(canvas, inner);

            let controls = Paragraph::new(CONTROLS)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .style(Style::default().fg(colors.border)),
                )
                .style(Style::default().fg(colors.text))
                .alignment(Alignment::Center);
            frame.render_widget(controls, controls_area);
        })?;
        Ok(())
    }
}

/// Maps field coordinates (y down) onto a canvas context (y up).
///
/// Filled shapes become one horizontal line per braille dot row.
struct CanvasPainter<'a, 'b> {
    ctx: &'a mut Context<'b>,
    field: Field,
    dot_height: f64,
    cell_width: f64,
}

impl<'a, 'b> CanvasPainter<'a, 'b> {
    fn new(ctx: &'a mut Context<'b>, field: Field, area: Rect) -> Self {
        // Braille cells are two dots wide and four tall.
        let rows = f64::from(area.height.max(1)) * 4.0;
        let columns = f64::from(area.width.max(1));
        Self {
            ctx,
            field,
            dot_height: field.height as f64 / rows,
            cell_width: field.width as f64 / columns,
        }
    }

    fn flip(&self, y: f64) -> f64 {
        self.field.height as f64 - y
    }

    fn span(&mut self, x1: f64, x2: f64, y: f64, color: Color) {
        let y = self.flip(y);
        self.ctx.draw(&Line::new(x1, y, x2, y, color));
    }

    /// Fill rows `y..y + height`; `extent(row)` gives the horizontal run for a
    /// row, or `None` to leave it empty.
    fn scan(&mut self, y: f64, height: f64, color: Color, extent: impl Fn(f64) -> Option<(f64, f64)>) {
        if height <= 0.0 {
            return;
        }
        let rows = (height / self.dot_height).ceil() as usize;
        for row in 0..=rows {
            let row_y = (y + row as f64 * self.dot_height).min(y + height);
            if let Some((x1, x2)) = extent(row_y) {
                self.span(x1, x2, row_y, color);
            }
        }
    }
}

impl Painter for CanvasPainter<'_, '_> {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let (x, width) = (x as f64, width as f64);
        self.scan(y as f64, height as f64, color, |_| Some((x, x + width)));
    }

    fn fill_round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, arc: f32, color: Color) {
        let (x, y, width, height) = (x as f64, y as f64, width as f64, height as f64);
        let radius = (arc as f64 / 2.0).min(width / 2.0).min(height / 2.0).max(0.0);

        self.scan(y, height, color, |row_y| {
            let from_edge = (row_y - y).min(y + height - row_y);
            let inset = if from_edge < radius {
                let dy = radius - from_edge;
                radius - (radius * radius - dy * dy).max(0.0).sqrt()
            } else {
                0.0
            };
            Some((x + inset, x + width - inset))
        });
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let (rx, ry) = (width as f64 / 2.0, height as f64 / 2.0);
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let (cx, cy) = (x as f64 + rx, y as f64 + ry);

        self.scan(y as f64, height as f64, color, |row_y| {
            let dy = (row_y - cy) / ry;
            let reach = 1.0 - dy * dy;
            (reach >= 0.0).then(|| {
                let half = rx * reach.sqrt();
                (cx - half, cx + half)
            })
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let bottom = self.flip((y + height) as f64);
        self.ctx.draw(&Rectangle {
            x: x as f64,
            y: bottom,
            width: width as f64,
            height: height as f64,
            color,
        });
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Color) {
        let y = self.flip(y as f64);
        self.ctx
            .print(x as f64, y, Span::styled(text.to_string(), Style::default().fg(color)));
    }

    fn text_width(&self, text: &str) -> f32 {
        (text.chars().count() as f64 * self.cell_width) as f32
    }
}

pub fn map_key(event: &KeyEvent) -> Option<Key> {
    let key = match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::Esc,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
        _ => return None,
    };
    Some(key)
}

/// Asks the terminal for key release events; undone on drop.
pub struct KeyboardEnhancement {
    enabled: bool,
}

impl KeyboardEnhancement {
    pub fn enable() -> Self {
        let enabled = matches!(supports_keyboard_enhancement(), Ok(true))
            && io::stdout()
                .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
                .is_ok();
        debug!(enabled, "keyboard release events");
        Self { enabled }
    }

    pub fn reports_releases(&self) -> bool {
        self.enabled
    }
}

impl Drop for KeyboardEnhancement {
    fn drop(&mut self) {
        if self.enabled {
            let _ = io::stdout().execute(PopKeyboardEnhancementFlags);
        }
    }
}

struct HeldKey {
    last_seen: Instant,
    repeating: bool,
}

/// Turns terminal key events into held/released keys on an [`InputState`].
pub struct KeyTracker {
    reports_releases: bool,
    held: HashMap<Key, HeldKey>,
}

impl KeyTracker {
    pub fn new(reports_releases: bool) -> Self {
        Self {
            reports_releases,
            held: HashMap::new(),
        }
    }

    pub fn apply(&mut self, input: &InputState, event: &KeyEvent, now: Instant) {
        let Some(key) = map_key(event) else {
            return;
        };
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                input.press(key);
                self.held
                    .entry(key)
                    .and_modify(|held| {
                        held.last_seen = now;
                        held.repeating = true;
                    })
                    .or_insert(HeldKey {
                        last_seen: now,
                        repeating: false,
                    });
            }
            KeyEventKind::Release => {
                input.release(key);
                self.held.remove(&key);
            }
        }
    }

    /// Release keys whose auto-repeat has gone quiet. No-op when the terminal
    /// reports releases itself.
    pub fn expire(&mut self, input: &InputState, now: Instant) {
        if self.reports_releases {
            return;
        }
        self.held.retain(|key, held| {
            let window = if held.repeating {
                REPEAT_WINDOW
            } else {
                FIRST_REPEAT_WINDOW
            };
            let still_held = now.duration_since(held.last_seen) < window;
            if !still_held {
                input.release(*key);
            }
            still_held
        });
    }
}

/// Feed terminal key events into `input` until `quit` is set.
pub fn pump_events(input: &InputState, quit: &AtomicBool, reports_releases: bool) -> PongResult<()> {
    let mut keys = KeyTracker::new(reports_releases);

    while !quit.load(Ordering::Acquire) {
        if event::poll(EVENT_POLL_INTERVAL)? {
            if let Event::Key(key_event) = event::read()? {
                keys.apply(input, &key_event, Instant::now());
            }
        }
        keys.expire(input, Instant::now());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn key_codes_map_to_keys() {
        assert_eq!(map_key(&key(KeyCode::Up, KeyEventKind::Press)), Some(Key::Up));
        assert_eq!(map_key(&key(KeyCode::Char(' '), KeyEventKind::Press)), Some(Key::Space));
        assert_eq!(map_key(&key(KeyCode::Char('B'), KeyEventKind::Press)), Some(Key::Char('b')));
        assert_eq!(map_key(&key(KeyCode::F(1), KeyEventKind::Press)), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(Key::Esc));
    }

    #[test]
    fn release_events_release_keys() {
        let input = InputState::new();
        let mut keys = KeyTracker::new(true);
        let now = Instant::now();

        keys.apply(&input, &key(KeyCode::Up, KeyEventKind::Press), now);
        assert!(input.is_pressed(Key::Up));

        // Reported releases: holding never times out.
        keys.expire(&input, now + Duration::from_secs(5));
        assert!(input.is_pressed(Key::Up));

        keys.apply(&input, &key(KeyCode::Up, KeyEventKind::Release), now);
        assert!(!input.is_pressed(Key::Up));
    }

    #[test]
    fn a_tap_is_released_once_the_repeat_delay_has_passed() {
        let input = InputState::new();
        let mut keys = KeyTracker::new(false);
        let start = Instant::now();

        keys.apply(&input, &key(KeyCode::Down, KeyEventKind::Press), start);
        keys.expire(&input, start + Duration::from_millis(600));
        assert!(input.is_pressed(Key::Down));

        keys.expire(&input, start + FIRST_REPEAT_WINDOW);
        assert!(!input.is_pressed(Key::Down));
    }

    #[test]
    fn one_hold_with_a_slow_repeat_delay_fires_callbacks_once() {
        use std::sync::{atomic::AtomicUsize, Arc};

        let input = InputState::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        input.on_press(Key::Char('b'), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut keys = KeyTracker::new(false);
        let start = Instant::now();
        let b = key(KeyCode::Char('b'), KeyEventKind::Press);
        keys.apply(&input, &b, start);

        // OS repeat delay of 500 ms, then a repeat every 35 ms.
        let mut next_repeat = Duration::from_millis(500);
        for ms in (0..=1000).step_by(5) {
            let now = Duration::from_millis(ms);
            if now >= next_repeat {
                keys.apply(&input, &b, start + now);
                next_repeat += Duration::from_millis(35);
            }
            keys.expire(&input, start + now);
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(input.is_pressed(Key::Char('b')));

        // Once repeats stop the key goes quickly.
        let last = start + Duration::from_millis(1000);
        keys.expire(&input, last + REPEAT_WINDOW);
        assert!(!input.is_pressed(Key::Char('b')));
    }
}
