use std::sync::Arc;

use ratatui::style::Color;

use crate::{
    ai::PredictiveAi,
    ball::BallTracker,
    collision::BoundingBox,
    config::{Field, Params},
    entity::{Body, Entity},
    input::{InputState, Key},
    render::Painter,
};

pub const CORNER_ARC: f32 = 10.0;
// Paddle hit box reaches a little past both ends.
const BOX_OUTSET_Y: u32 = 5;

/// Paddle moved by two keys of the shared input state.
pub struct HumanControl {
    input: Arc<InputState>,
    up: Key,
    down: Key,
}

impl HumanControl {
    pub fn new(input: Arc<InputState>, up: Key, down: Key) -> Self {
        Self { input, up, down }
    }

    /// -1 for up, 1 for down, 0 for neither. Up wins when both are held.
    fn direction(&self) -> f32 {
        if self.input.is_pressed(self.up) {
            -1.0
        } else if self.input.is_pressed(self.down) {
            1.0
        } else {
            0.0
        }
    }
}

pub enum Control {
    Human(HumanControl),
    Ai(PredictiveAi),
}

impl Control {
    pub fn human(input: Arc<InputState>, up: Key, down: Key) -> Self {
        Control::Human(HumanControl::new(input, up, down))
    }

    pub fn ai(tracker: BallTracker) -> Self {
        Control::Ai(PredictiveAi::new(tracker))
    }
}

pub struct Paddle {
    body: Body,
    color: Color,
    speed: f32,
    field: Field,
    control: Control,
}

impl Paddle {
    pub fn new(x: f32, y: f32, color: Color, speed: f32, field: Field, control: Control) -> Self {
        let (width, height) = (Params::PADDLE_WIDTH, Params::PADDLE_HEIGHT);
        let bounding_box = BoundingBox::new(
            0.0,
            -(BOX_OUTSET_Y as f32),
            width as f32,
            (height + 2 * BOX_OUTSET_Y) as f32,
        );

        let mut paddle = Self {
            body: Body::with_bounding_box(x, y, width, height, bounding_box),
            color,
            speed,
            field,
            control,
        };
        paddle.clamp_to_field();
        paddle
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.control, Control::Ai(_))
    }

    pub fn set_y(&mut self, y: f32) {
        self.body.y = y;
        self.clamp_to_field();
    }

    fn clamp_to_field(&mut self) {
        let max_y = (self.field.height - self.body.height as f32).max(0.0);
        self.body.y = self.body.y.clamp(0.0, max_y);
    }
}

impl Entity for Paddle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn render(&self, painter: &mut dyn Painter) {
        painter.fill_round_rect(
            self.body.x,
            self.body.y,
            self.body.width as f32,
            self.body.height as f32,
            CORNER_ARC,
            self.color,
        );
    }

    fn update(&mut self, delta_time: f32) {
        let direction = match &mut self.control {
            Control::Human(human) => human.direction(),
            Control::Ai(ai) => ai.update(delta_time, &self.body, self.field),
        };
        self.body.y += direction * self.speed * delta_time;
        self.clamp_to_field();
    }
}
