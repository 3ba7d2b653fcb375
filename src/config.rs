use std::{env, time::Duration};

use crate::{
    error::{PongError, PongResult},
    theme::GameTheme,
};

/// Reference tuning values for the court, the entities and the two loops.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Field
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    // Paddle
    pub const PADDLE_WIDTH: u32 = 10;
    pub const PADDLE_HEIGHT: u32 = 80;
    pub const PADDLE_MARGIN: f32 = 30.0;
    pub const PADDLE_SPEED: f32 = 500.0;
    pub const AI_PADDLE_SPEED: f32 = 600.0;

    // Ball
    pub const BALL_RADIUS: u32 = 12;

    // Net
    pub const NET_WIDTH: u32 = 5;

    // Loops
    pub const UPDATES_PER_SECOND: u32 = 60;
    pub const MAX_FRAMES_PER_SECOND: u32 = 500;
    pub const JOIN_TIMEOUT: Duration = Duration::from_secs(1);
}

/// Playing field dimensions, origin top-left, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new(Params::FIELD_WIDTH, Params::FIELD_HEIGHT)
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub field: Field,
    pub ball_radius: u32,
    pub paddle_speed: f32,
    pub ai_paddle_speed: f32,
    pub updates_per_second: u32,
    pub max_frames_per_second: u32,
    pub join_timeout: Duration,
    pub show_bounding_boxes: bool,
    pub theme: GameTheme,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field: Field::default(),
            ball_radius: Params::BALL_RADIUS,
            paddle_speed: Params::PADDLE_SPEED,
            ai_paddle_speed: Params::AI_PADDLE_SPEED,
            updates_per_second: Params::UPDATES_PER_SECOND,
            max_frames_per_second: Params::MAX_FRAMES_PER_SECOND,
            join_timeout: Params::JOIN_TIMEOUT,
            show_bounding_boxes: true,
            theme: GameTheme::default(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PONG_THEME`, `PONG_BOUNDING_BOXES` and `PONG_MAX_FPS`.
    pub fn from_env() -> PongResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PongResult<Self> {
        let mut config = Self::default();

        if let Some(theme) = lookup("PONG_THEME") {
            config.theme = theme.parse()?;
        }

        if let Some(flag) = lookup("PONG_BOUNDING_BOXES") {
            config.show_bounding_boxes = parse_flag(&flag).ok_or_else(|| {
                PongError::InvalidConfig(format!("PONG_BOUNDING_BOXES: expected on/off, got '{flag}'"))
            })?;
        }

        if let Some(fps) = lookup("PONG_MAX_FPS") {
            config.max_frames_per_second = fps
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|fps| *fps > 0)
                .ok_or_else(|| {
                    PongError::InvalidConfig(format!("PONG_MAX_FPS: expected a positive integer, got '{fps}'"))
                })?;
        }

        Ok(config)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(1) / self.updates_per_second.max(1)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_secs(1) / self.max_frames_per_second.max(1)
    }

    pub fn left_paddle_x(&self) -> f32 {
        Params::PADDLE_MARGIN
    }

    pub fn right_paddle_x(&self) -> f32 {
        self.field.width - Params::PADDLE_MARGIN - Params::PADDLE_WIDTH as f32
    }

    /// Vertical start so a paddle sits centred on the field.
    pub fn paddle_start_y(&self) -> f32 {
        self.field.center_y() - Params::PADDLE_HEIGHT as f32 / 2.0
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
