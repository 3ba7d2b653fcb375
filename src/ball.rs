use std::sync::Arc;

use parking_lot::RwLock;
use rand::{rngs::StdRng, Rng, SeedableRng};
use ratatui::style::Color;
use tracing::debug;

use crate::{
    collision::BoundingBox,
    config::Field,
    entity::{Body, Entity},
    render::Painter,
};

pub const MAX_VELOCITY: f32 = 1000.0;
pub const DEFAULT_VELOCITY: f32 = 400.0;
pub const VELOCITY_INCREASE: f32 = 15.0;

/// Smallest horizontal share of a serve direction, so the ball never goes straight up.
pub const MIN_HORIZONTAL_DIRECTION: f32 = 0.25;
/// Smallest vertical share after a paddle hit.
pub const MIN_VERTICAL_DIRECTION: f32 = 0.1;
const PADDLE_ANGLE_DAMPING: f32 = 0.8;

// Hit box is narrower than the sprite horizontally and taller vertically.
const BOX_INSET_X: u32 = 2;
const BOX_OUTSET_Y: u32 = 2;

/// The side credited with a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Receives score events from the ball, on the update thread.
pub trait ScoreListener: Send {
    fn on_score(&mut self, side: Side);
}

impl<F: FnMut(Side) + Send> ScoreListener for F {
    fn on_score(&mut self, side: Side) {
        self(side)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoScoreListener;

impl ScoreListener for NoScoreListener {
    fn on_score(&mut self, _side: Side) {}
}

/// Ball state as last published by the update thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: u32,
    pub height: u32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub speed: f32,
}

/// Read-only view of a ball, for whoever needs to follow it without owning it.
#[derive(Debug, Clone)]
pub struct BallTracker {
    state: Arc<RwLock<BallSnapshot>>,
}

impl BallTracker {
    fn new(snapshot: BallSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> BallSnapshot {
        *self.state.read()
    }

    fn publish(&self, snapshot: BallSnapshot) {
        *self.state.write() = snapshot;
    }
}

pub struct Ball {
    body: Body,
    radius: u32,
    color: Color,
    field: Field,
    velocity_x: f32,
    velocity_y: f32,
    speed: f32,
    bounced: bool,
    listener: Box<dyn ScoreListener>,
    rng: StdRng,
    tracker: BallTracker,
}

impl Ball {
    pub fn new(x: f32, y: f32, radius: u32, color: Color, field: Field) -> Self {
        Self::with_rng(x, y, radius, color, field, StdRng::from_os_rng())
    }

    /// Same as [`Ball::new`] but serving from the given random source.
    pub fn with_rng(x: f32, y: f32, radius: u32, color: Color, field: Field, rng: StdRng) -> Self {
        let diameter = radius * 2;
        let bounding_box = BoundingBox::new(
            BOX_INSET_X as f32,
            -(BOX_OUTSET_Y as f32),
            diameter.saturating_sub(2 * BOX_INSET_X) as f32,
            (diameter + 2 * BOX_OUTSET_Y) as f32,
        );
        let body = Body::with_bounding_box(x, y, diameter, diameter, bounding_box);

        let mut ball = Self {
            body,
            radius,
            color,
            field,
            velocity_x: 0.0,
            velocity_y: 0.0,
            speed: DEFAULT_VELOCITY,
            bounced: false,
            listener: Box::new(NoScoreListener),
            tracker: BallTracker::new(BallSnapshot {
                x,
                y,
                width: diameter,
                height: diameter,
                velocity_x: 0.0,
                velocity_y: 0.0,
                speed: DEFAULT_VELOCITY,
            }),
            rng,
        };
        ball.set_random_velocity();
        ball
    }

    pub fn with_score_listener(mut self, listener: impl ScoreListener + 'static) -> Self {
        self.set_score_listener(listener);
        self
    }

    pub fn set_score_listener(&mut self, listener: impl ScoreListener + 'static) {
        self.listener = Box::new(listener);
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.velocity_x, self.velocity_y)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether the last update ended with a top or bottom wall bounce.
    pub fn bounced(&self) -> bool {
        self.bounced
    }

    pub fn tracker(&self) -> BallTracker {
        self.tracker.clone()
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.body.x = x;
        self.body.y = y;
        self.publish();
    }

    /// Set the direction as given. Callers are expected to pass a normalized vector.
    pub fn set_velocity(&mut self, velocity_x: f32, velocity_y: f32) {
        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
        self.publish();
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(0.0, MAX_VELOCITY);
        self.publish();
    }

    /// Pick a serve direction whose components sum to 1 in absolute value,
    /// with at least [`MIN_HORIZONTAL_DIRECTION`] of it horizontal.
    pub fn set_random_velocity(&mut self) {
        let horizontal = self.rng.random_range(MIN_HORIZONTAL_DIRECTION..1.0);
        let vertical = 1.0 - horizontal;

        self.velocity_x = if self.rng.random_bool(0.5) { horizontal } else { -horizontal };
        self.velocity_y = if self.rng.random_bool(0.5) { vertical } else { -vertical };
        self.publish();
    }

    /// Back to the centre of the field with a fresh serve at default speed.
    pub fn reset(&mut self) {
        let radius = self.radius as f32;
        self.body.x = self.field.center_x() - radius;
        self.body.y = self.field.center_y() - radius;
        self.speed = DEFAULT_VELOCITY;
        self.set_random_velocity();
    }

    /// Bounce off a paddle. The further from the paddle centre the ball hits,
    /// the steeper it leaves.
    ///
    /// Detecting the contact is the caller's job; call this once per contact.
    pub fn handle_paddle_collision(&mut self, paddle: &Body) {
        let half_height = paddle.height as f32 / 2.0;
        let hit_offset = (self.body.center_y() - paddle.center_y()) / half_height;

        let mut velocity_x = -self.velocity_x;
        let mut velocity_y = hit_offset * PADDLE_ANGLE_DAMPING;
        if velocity_y.abs() < MIN_VERTICAL_DIRECTION {
            velocity_y = MIN_VERTICAL_DIRECTION.copysign(velocity_y);
        }

        // Unit length here, unlike the serve which sums to 1.
        let length = velocity_x.hypot(velocity_y);
        velocity_x /= length;
        velocity_y /= length;

        // Normalizing can shave the vertical part back under the floor.
        if velocity_y.abs() < MIN_VERTICAL_DIRECTION {
            velocity_y = MIN_VERTICAL_DIRECTION.copysign(velocity_y);
            velocity_x = (1.0 - velocity_y * velocity_y).sqrt().copysign(velocity_x);
        }

        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
        self.speed_up();
        self.publish();
    }

    fn speed_up(&mut self) {
        self.speed = (self.speed + VELOCITY_INCREASE).min(MAX_VELOCITY);
    }

    fn score(&mut self, side: Side) {
        debug!(?side, speed = self.speed, "ball left the field");
        self.listener.on_score(side);
        self.reset();
    }

    fn publish(&self) {
        self.tracker.publish(BallSnapshot {
            x: self.body.x,
            y: self.body.y,
            width: self.body.width,
            height: self.body.height,
            velocity_x: self.velocity_x,
            velocity_y: self.velocity_y,
            speed: self.speed,
        });
    }
}

impl Entity for Ball {
    fn body(&self) -> &Body {
        &self.body
    }

    fn render(&self, painter: &mut dyn Painter) {
        painter.fill_ellipse(
            self.body.x,
            self.body.y,
            self.body.width as f32,
            self.body.height as f32,
            self.color,
        );
    }

    fn update(&mut self, delta_time: f32) {
        self.bounced = false;
        self.body.x += self.velocity_x * self.speed * delta_time;
        self.body.y += self.velocity_y * self.speed * delta_time;

        let max_x = self.field.width - self.body.width as f32;
        let max_y = self.field.height - self.body.height as f32;

        // Scoring wins over a wall bounce in the same tick.
        if self.body.x < 0.0 {
            self.score(Side::Right);
        } else if self.body.x > max_x {
            self.score(Side::Left);
        } else if self.body.y < 0.0 || self.body.y > max_y {
            self.body.y = self.body.y.clamp(0.0, max_y);
            self.velocity_y = -self.velocity_y;
            self.bounced = true;
            self.speed_up();
        }

        self.publish();
    }
}
