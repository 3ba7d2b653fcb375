//! Real-time pong: a human paddle against a predictive AI.
//!
//! The simulation runs on a fixed-rate update thread, drawing on an
//! independent render thread; both share the entities through a [`Registry`].

pub mod ai;
pub mod ball;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod input;
pub mod net;
pub mod paddle;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod terminal;
pub mod text;
pub mod theme;

pub use ball::{Ball, BallTracker, ScoreListener, Side};
pub use config::{Field, GameConfig, Params};
pub use entity::{Body, Entity};
pub use error::{PongError, PongResult};
pub use game::{Game, Score};
pub use input::{InputState, Key};
pub use registry::{Handle, Registry};
pub use render::{Overlay, Painter, Surface};
pub use session::Session;
pub use theme::GameTheme;
