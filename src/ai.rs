use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::{ball::BallTracker, config::Field, entity::Body};

pub const MIN_REACTION_DELAY: f32 = 0.15;
pub const MAX_REACTION_DELAY: f32 = 0.3;
/// Time without a mistake before one becomes possible.
pub const MISTAKE_COOLDOWN: f32 = 3.0;
/// Per-tick odds of a mistake once the cooldown is over.
pub const MISTAKE_CHANCE: f64 = 0.1;
pub const MISTAKE_DURATION: f32 = 0.5;
/// Full spread of the prediction error, centred on zero.
pub const PREDICTION_JITTER: f32 = 20.0;
pub const DEAD_ZONE: f32 = 5.0;

/// Computer opponent: slow decisions, fast execution.
///
/// A new target is only picked every `reaction_delay` seconds, while the paddle
/// moves toward the current target on every tick. Every now and then the AI
/// commits to a random spot for a short while instead of tracking the ball.
pub struct PredictiveAi {
    tracker: BallTracker,
    rng: StdRng,
    reaction_delay: f32,
    reaction_timer: f32,
    target_y: Option<f32>,
    mistake_timer: f32,
    mistake_target: Option<f32>,
}

impl PredictiveAi {
    pub fn new(tracker: BallTracker) -> Self {
        Self::with_rng(tracker, StdRng::from_os_rng())
    }

    pub fn with_rng(tracker: BallTracker, rng: StdRng) -> Self {
        Self {
            tracker,
            rng,
            reaction_delay: MIN_REACTION_DELAY,
            reaction_timer: 0.0,
            target_y: None,
            mistake_timer: 0.0,
            mistake_target: None,
        }
    }

    pub fn target_y(&self) -> Option<f32> {
        self.target_y
    }

    pub fn reaction_delay(&self) -> f32 {
        self.reaction_delay
    }

    pub fn is_making_mistake(&self) -> bool {
        self.mistake_target.is_some()
    }

    /// Advance the timers, re-aim when the reaction delay is up, and return
    /// the direction to move this tick: -1 up, 1 down, 0 hold.
    pub fn update(&mut self, delta_time: f32, paddle: &Body, field: Field) -> f32 {
        self.reaction_timer += delta_time;
        self.mistake_timer += delta_time;

        let max_y = (field.height - paddle.height as f32).max(0.0);

        if self.mistake_target.is_none()
            && self.mistake_timer > MISTAKE_COOLDOWN
            && self.rng.random_bool(MISTAKE_CHANCE)
        {
            self.mistake_timer = 0.0;
            let target = self.rng.random::<f32>() * max_y;
            self.mistake_target = Some(target);
            self.reaction_delay = self.rng.random_range(MIN_REACTION_DELAY..MAX_REACTION_DELAY);
            debug!(target, reaction_delay = self.reaction_delay, "ai paddle makes a mistake");
        }

        if self.reaction_timer >= self.reaction_delay {
            self.reaction_timer = 0.0;

            match self.mistake_target {
                Some(target) => {
                    self.target_y = Some(target);
                    if self.mistake_timer > MISTAKE_DURATION {
                        self.mistake_target = None;
                        self.mistake_timer = 0.0;
                    }
                }
                None => {
                    if let Some(predicted) = self.predict(paddle, field, max_y) {
                        self.target_y = Some(predicted);
                    }
                }
            }
        }

        match self.target_y {
            Some(target) if target - paddle.y > DEAD_ZONE => 1.0,
            Some(target) if target - paddle.y < -DEAD_ZONE => -1.0,
            _ => 0.0,
        }
    }

    /// Where the paddle's top should be when the ball arrives, or `None` while
    /// the ball travels away from this paddle.
    fn predict(&mut self, paddle: &Body, field: Field, max_y: f32) -> Option<f32> {
        let ball = self.tracker.snapshot();

        let approaching = if paddle.center_x() > field.center_x() {
            ball.velocity_x > 0.0
        } else {
            ball.velocity_x < 0.0
        };
        let closing_speed = ball.velocity_x * ball.speed;
        if !approaching || closing_speed == 0.0 {
            return None;
        }

        let time_to_reach = (paddle.x - ball.x) / closing_speed;
        let predicted_y = ball.y + ball.velocity_y * ball.speed * time_to_reach;
        let jitter = (self.rng.random::<f32>() - 0.5) * PREDICTION_JITTER;

        Some((predicted_y - paddle.height as f32 / 2.0 + jitter).clamp(0.0, max_y))
    }
}
