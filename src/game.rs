use std::sync::{
    mpsc::{self, Receiver},
    Arc,
};

use tracing::{debug, info};

use crate::{
    ball::{Ball, BallTracker, Side},
    config::GameConfig,
    entity::{Body, Entity},
    input::{InputState, Key},
    net::NetEntity,
    paddle::{Control, Paddle},
    registry::{Entities, Handle, Registry},
    text::TextEntity,
};

const SCORE_LABEL_Y: f32 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn record(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }
}

/// Key bindings for the human paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddleKeys {
    pub up: Key,
    pub down: Key,
}

impl Default for PaddleKeys {
    fn default() -> Self {
        Self {
            up: Key::Up,
            down: Key::Down,
        }
    }
}

/// Top-level match: owns the entities (through registry handles) and the score.
///
/// Entities are registered on construction and unregistered when the game is
/// dropped. All simulation happens in [`Game::update`].
pub struct Game {
    registry: Arc<Registry>,
    net: Handle<NetEntity>,
    ball: Handle<Ball>,
    left_paddle: Handle<Paddle>,
    right_paddle: Handle<Paddle>,
    left_label: Handle<TextEntity>,
    right_label: Handle<TextEntity>,
    tracker: BallTracker,
    scores: Receiver<Side>,
    score: Score,
    ticks: u64,
}

impl Game {
    pub fn new(config: &GameConfig, registry: Arc<Registry>, input: Arc<InputState>) -> Self {
        let ball = Ball::new(0.0, 0.0, config.ball_radius, config.theme.colors().ball, config.field);
        Self::with_ball(config, registry, input, PaddleKeys::default(), ball)
    }

    /// Build a match around a prepared ball, e.g. one with a seeded serve.
    ///
    /// The human plays the left paddle with `keys`, the AI the right one.
    pub fn with_ball(
        config: &GameConfig,
        registry: Arc<Registry>,
        input: Arc<InputState>,
        keys: PaddleKeys,
        mut ball: Ball,
    ) -> Self {
        let colors = config.theme.colors();
        let field = config.field;

        let (sender, scores) = mpsc::channel();
        ball.set_score_listener(move |side| {
            // The receiver only goes away with the game itself.
            let _ = sender.send(side);
        });
        ball.reset();
        let tracker = ball.tracker();

        let left_paddle = Paddle::new(
            config.left_paddle_x(),
            config.paddle_start_y(),
            colors.left_paddle,
            config.paddle_speed,
            field,
            Control::human(input, keys.up, keys.down),
        );
        let right_paddle = Paddle::new(
            config.right_paddle_x(),
            config.paddle_start_y(),
            colors.right_paddle,
            config.ai_paddle_speed,
            field,
            Control::ai(tracker.clone()),
        );

        let left_label = TextEntity::new(field.width / 4.0, SCORE_LABEL_Y, colors.text).with_text("0");
        let right_label = TextEntity::new(field.width * 3.0 / 4.0, SCORE_LABEL_Y, colors.text).with_text("0");

        let (net, ball, left_paddle, right_paddle, left_label, right_label) = {
            let mut entities = registry.lock();
            (
                entities.insert(NetEntity::new(field, colors.net)),
                entities.insert(ball),
                entities.insert(left_paddle),
                entities.insert(right_paddle),
                entities.insert(left_label),
                entities.insert(right_label),
            )
        };
        info!(width = field.width, height = field.height, theme = %config.theme, "game created");

        Self {
            registry,
            net,
            ball,
            left_paddle,
            right_paddle,
            left_label,
            right_label,
            tracker,
            scores,
            score: Score::default(),
            ticks: 0,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ball_tracker(&self) -> BallTracker {
        self.tracker.clone()
    }

    pub fn ball(&self) -> Handle<Ball> {
        self.ball
    }

    pub fn left_paddle(&self) -> Handle<Paddle> {
        self.left_paddle
    }

    pub fn right_paddle(&self) -> Handle<Paddle> {
        self.right_paddle
    }

    pub fn left_label(&self) -> Handle<TextEntity> {
        self.left_label
    }

    pub fn right_label(&self) -> Handle<TextEntity> {
        self.right_label
    }

    /// One simulation tick.
    ///
    /// Every entity is updated in registration order, then the ball is checked
    /// against both paddles, then score events from this tick are applied. The
    /// registry stays locked for the whole tick.
    pub fn update(&mut self, delta_time: f32) {
        let mut entities = self.registry.lock();

        entities.update_all(delta_time);

        for paddle in [self.left_paddle, self.right_paddle] {
            resolve_paddle_contact(&mut entities, self.ball, paddle);
        }

        let mut scored = false;
        for side in self.scores.try_iter() {
            self.score.record(side);
            scored = true;
            debug!(?side, left = self.score.left, right = self.score.right, "point scored");
        }
        if scored {
            if let Some(label) = entities.get_mut(self.left_label) {
                label.set_text(self.score.left.to_string());
            }
            if let Some(label) = entities.get_mut(self.right_label) {
                label.set_text(self.score.right.to_string());
            }
        }

        self.ticks += 1;
    }
}

/// Bounce the ball off `paddle` if their boxes overlap and the ball is still
/// heading toward it. Once reflected the ball moves away, so a contact that
/// lasts several ticks only bounces once.
fn resolve_paddle_contact(entities: &mut Entities, ball: Handle<Ball>, paddle: Handle<Paddle>) {
    let (Some(ball_entity), Some(paddle_entity)) = (entities.get(ball), entities.get(paddle)) else {
        return;
    };
    if !ball_entity.collides_with(paddle_entity) {
        return;
    }

    let paddle_body: Body = *paddle_entity.body();
    let (velocity_x, _) = ball_entity.velocity();
    let approaching = if paddle_body.center_x() > ball_entity.body().center_x() {
        velocity_x > 0.0
    } else {
        velocity_x < 0.0
    };
    if !approaching {
        return;
    }
    if let Some(ball) = entities.get_mut(ball) {
        ball.handle_paddle_collision(&paddle_body);
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        let mut entities = self.registry.lock();
        entities.remove(self.net);
        entities.remove(self.ball);
        entities.remove(self.left_paddle);
        entities.remove(self.right_paddle);
        entities.remove(self.left_label);
        entities.remove(self.right_label);
    }
}
