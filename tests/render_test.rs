use std::sync::Arc;

use pong_engine::{
    ball::Ball,
    render::{draw_scene, FPS_BASELINE, FPS_MARGIN},
    text::TextEntity,
    Field, Game, GameConfig, GameTheme, InputState, Overlay, Painter, Registry,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::style::Color;

const CHAR_WIDTH: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    FillRect(f32, f32, f32, f32),
    FillRoundRect(f32, f32, f32, f32, f32),
    FillEllipse(f32, f32, f32, f32),
    StrokeRect(f32, f32, f32, f32, Color),
    Text(f32, f32, String),
}

/// Records every draw call; every character is `CHAR_WIDTH` wide.
#[derive(Default)]
struct RecordingPainter {
    ops: Vec<Op>,
}

impl RecordingPainter {
    fn texts(&self) -> Vec<&Op> {
        self.ops.iter().filter(|op| matches!(op, Op::Text(..))).collect()
    }

    fn strokes(&self) -> Vec<&Op> {
        self.ops.iter().filter(|op| matches!(op, Op::StrokeRect(..))).collect()
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, _color: Color) {
        self.ops.push(Op::FillRect(x, y, width, height));
    }

    fn fill_round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, arc: f32, _color: Color) {
        self.ops.push(Op::FillRoundRect(x, y, width, height, arc));
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32, _color: Color) {
        self.ops.push(Op::FillEllipse(x, y, width, height));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.ops.push(Op::StrokeRect(x, y, width, height, color));
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, _color: Color) {
        self.ops.push(Op::Text(x, y, text.to_string()));
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * CHAR_WIDTH
    }
}

fn overlay(show_boxes: bool) -> Overlay {
    Overlay::new(show_boxes, &GameTheme::default().colors())
}

#[test]
fn test_text_is_centred_on_its_position() {
    let registry = Registry::new();
    registry.register(TextEntity::new(200.0, 20.0, Color::White).with_text("12"));

    let mut painter = RecordingPainter::default();
    draw_scene(&mut painter, &registry, &overlay(false), 0, Field::default());

    assert_eq!(painter.texts()[0], &Op::Text(190.0, 20.0, "12".to_string()));
}

#[test]
fn test_empty_text_draws_nothing() {
    let registry = Registry::new();
    registry.register(TextEntity::new(200.0, 20.0, Color::White));

    let mut painter = RecordingPainter::default();
    draw_scene(&mut painter, &registry, &overlay(false), 0, Field::default());

    // Only the fps counter.
    assert_eq!(painter.texts().len(), 1);
}

#[test]
fn test_fps_counter_sits_in_the_top_right_corner() {
    let registry = Registry::new();
    let mut painter = RecordingPainter::default();

    draw_scene(&mut painter, &registry, &overlay(false), 42, Field::default());

    let expected_x = 800.0 - 7.0 * CHAR_WIDTH - FPS_MARGIN;
    assert_eq!(
        painter.ops,
        vec![Op::Text(expected_x, FPS_BASELINE, "fps: 42".to_string())]
    );
}

#[test]
fn test_bounding_boxes_follow_the_overlay_flag() {
    let registry = Registry::new();
    let ball = Ball::with_rng(100.0, 100.0, 12, Color::White, Field::default(), StdRng::seed_from_u64(3));
    registry.register(ball);
    let overlay = overlay(true);

    let mut painter = RecordingPainter::default();
    draw_scene(&mut painter, &registry, &overlay, 0, Field::default());

    let box_color = GameTheme::default().colors().bounding_box;
    assert_eq!(painter.ops[0], Op::FillEllipse(100.0, 100.0, 24.0, 24.0));
    assert_eq!(painter.ops[1], Op::StrokeRect(102.0, 98.0, 20.0, 28.0, box_color));

    overlay.toggle_bounding_boxes();
    let mut painter = RecordingPainter::default();
    draw_scene(&mut painter, &registry, &overlay, 0, Field::default());
    assert!(painter.strokes().is_empty());
}

#[test]
fn test_full_game_frame_is_drawn_in_registration_order() {
    let config = GameConfig {
        show_bounding_boxes: false,
        ..GameConfig::new()
    };
    let game = Game::new(&config, Arc::new(Registry::new()), Arc::new(InputState::new()));
    let overlay = Overlay::new(config.show_bounding_boxes, &config.theme.colors());

    let mut painter = RecordingPainter::default();
    draw_scene(&mut painter, game.registry(), &overlay, 60, config.field);

    assert_eq!(painter.ops.len(), 7);
    assert_eq!(painter.ops[0], Op::FillRect(397.5, 0.0, 5.0, 600.0));
    assert_eq!(painter.ops[1], Op::FillEllipse(388.0, 288.0, 24.0, 24.0));
    assert_eq!(painter.ops[2], Op::FillRoundRect(30.0, 260.0, 10.0, 80.0, 10.0));
    assert_eq!(painter.ops[3], Op::FillRoundRect(760.0, 260.0, 10.0, 80.0, 10.0));
    assert_eq!(painter.ops[4], Op::Text(195.0, 20.0, "0".to_string()));
    assert_eq!(painter.ops[5], Op::Text(595.0, 20.0, "0".to_string()));
    assert_eq!(painter.ops[6], Op::Text(800.0 - 70.0 - 10.0, 20.0, "fps: 60".to_string()));
}
