use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    ball::BallTracker,
    config::GameConfig,
    error::PongResult,
    game::{Game, Score},
    input::InputState,
    registry::Registry,
    render::{draw_scene, Overlay, Painter, Surface},
    scheduler::{FixedRateLoop, FpsCounter},
};

/// A running match: the game, the surface it is drawn on and the two loops
/// driving them.
///
/// The update loop advances the game at a fixed rate; the render loop draws
/// whatever the registry holds, as often as the frame cap allows. Neither loop
/// waits for the other.
pub struct Session<S: Surface> {
    config: GameConfig,
    game: Arc<Mutex<Game>>,
    registry: Arc<Registry>,
    overlay: Arc<Overlay>,
    surface: Arc<Mutex<S>>,
    update_loop: FixedRateLoop,
    render_loop: FixedRateLoop,
}

impl<S: Surface> Session<S> {
    pub fn new(config: GameConfig, surface: S, input: Arc<InputState>) -> Self {
        let registry = Arc::new(Registry::new());
        let game = Game::new(&config, Arc::clone(&registry), input);
        Self::with_game(config, game, surface)
    }

    /// Wrap an already built game. The game's registry is the one rendered.
    pub fn with_game(config: GameConfig, game: Game, surface: S) -> Self {
        let registry = Arc::clone(game.registry());
        let overlay = Arc::new(Overlay::new(config.show_bounding_boxes, &config.theme.colors()));
        let update_loop =
            FixedRateLoop::new("update", config.update_interval()).with_join_timeout(config.join_timeout);
        let render_loop =
            FixedRateLoop::new("render", config.render_interval()).with_join_timeout(config.join_timeout);

        Self {
            config,
            game: Arc::new(Mutex::new(game)),
            registry,
            overlay,
            surface: Arc::new(Mutex::new(surface)),
            update_loop,
            render_loop,
        }
    }

    /// Start the update loop, then the render loop.
    ///
    /// A loop that is already running is left alone, so calling this again
    /// restarts only a loop whose thread has died.
    pub fn start_game(&mut self) -> PongResult<()> {
        let game = Arc::clone(&self.game);
        let update_started = self.update_loop.start(move |elapsed| {
            game.lock().update(elapsed.as_secs_f32());
        })?;

        let registry = Arc::clone(&self.registry);
        let overlay = Arc::clone(&self.overlay);
        let surface = Arc::clone(&self.surface);
        let field = self.config.field;
        let mut fps = FpsCounter::new();
        let mut warned = false;

        let render_started = match self.render_loop.start(move |_| {
            let frame_rate = fps.frame();
            let scene = |painter: &mut dyn Painter| draw_scene(painter, &registry, &overlay, frame_rate, field);
            let presented = surface.lock().present(&scene);
            if let Err(err) = presented {
                if warned {
                    debug!(error = %err, "render failed");
                } else {
                    warn!(error = %err, "render failed, further failures logged at debug");
                    warned = true;
                }
            }
        }) {
            Ok(started) => started,
            Err(err) => {
                if update_started {
                    self.update_loop.stop();
                }
                return Err(err);
            }
        };

        if update_started || render_started {
            info!(
                update_started,
                render_started,
                updates_per_second = self.config.updates_per_second,
                max_frames_per_second = self.config.max_frames_per_second,
                "game started"
            );
        } else {
            debug!("session already running");
        }
        Ok(())
    }

    /// Stop the render loop, then the update loop. Safe to call repeatedly.
    ///
    /// Each wait is bounded by the configured join timeout; a loop that
    /// overruns it is left to finish on its own.
    pub fn stop_game(&mut self) {
        let was_running = self.is_running();
        let render_stopped = self.render_loop.stop();
        let update_stopped = self.update_loop.stop();

        if was_running {
            let score = self.score();
            info!(
                left = score.left,
                right = score.right,
                clean = render_stopped && update_stopped,
                "game stopped"
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.update_loop.is_running() || self.render_loop.is_running()
    }

    pub fn score(&self) -> Score {
        self.game.lock().score()
    }

    pub fn ball_tracker(&self) -> BallTracker {
        self.game.lock().ball_tracker()
    }

    pub fn overlay(&self) -> &Arc<Overlay> {
        &self.overlay
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn game(&self) -> &Arc<Mutex<Game>> {
        &self.game
    }

    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.surface
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

impl<S: Surface> Drop for Session<S> {
    fn drop(&mut self) {
        self.stop_game();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PongError;
    use ratatui::style::Color;
    use std::{io, thread, time::Duration};

    /// Counts presented frames and how many draw calls each one made.
    #[derive(Default)]
    struct CountingSurface {
        frames: usize,
        last_draw_calls: usize,
        fail: bool,
        panic_once: bool,
    }

    #[derive(Default)]
    struct CountingPainter {
        calls: usize,
    }

    impl Painter for CountingPainter {
        fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: Color) {
            self.calls += 1;
        }
        fn fill_round_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Color) {
            self.calls += 1;
        }
        fn fill_ellipse(&mut self, _: f32, _: f32, _: f32, _: f32, _: Color) {
            self.calls += 1;
        }
        fn stroke_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: Color) {
            self.calls += 1;
        }
        fn draw_text(&mut self, _: f32, _: f32, _: &str, _: Color) {
            self.calls += 1;
        }
        fn text_width(&self, text: &str) -> f32 {
            text.len() as f32 * 8.0
        }
    }

    impl Surface for CountingSurface {
        fn present(&mut self, scene: &dyn Fn(&mut dyn Painter)) -> PongResult<()> {
            if self.panic_once {
                self.panic_once = false;
                panic!("surface blew up");
            }
            self.frames += 1;
            if self.fail {
                return Err(PongError::Io(io::Error::other("surface gone")));
            }
            let mut painter = CountingPainter::default();
            scene(&mut painter);
            self.last_draw_calls = painter.calls;
            Ok(())
        }
    }

    fn session(surface: CountingSurface) -> Session<CountingSurface> {
        let config = GameConfig {
            max_frames_per_second: 200,
            ..GameConfig::default()
        };
        Session::new(config, surface, Arc::new(InputState::new()))
    }

    #[test]
    fn start_and_stop_drive_both_loops() {
        let mut session = session(CountingSurface::default());
        assert!(!session.is_running());

        session.start_game().unwrap();
        assert!(session.is_running());
        thread::sleep(Duration::from_millis(150));
        session.stop_game();
        assert!(!session.is_running());

        assert!(session.game().lock().ticks() > 0);
        let surface = session.surface().lock();
        assert!(surface.frames > 0);
        assert!(surface.last_draw_calls > 0);
    }

    #[test]
    fn stop_is_idempotent_and_start_can_follow() {
        let mut session = session(CountingSurface::default());
        session.stop_game();

        session.start_game().unwrap();
        session.start_game().unwrap();
        session.stop_game();
        session.stop_game();
        assert!(!session.is_running());

        let ticks = session.game().lock().ticks();
        session.start_game().unwrap();
        thread::sleep(Duration::from_millis(60));
        session.stop_game();
        assert!(session.game().lock().ticks() > ticks);
    }

    #[test]
    fn stopping_keeps_the_entities_registered() {
        let mut session = session(CountingSurface::default());
        session.start_game().unwrap();
        thread::sleep(Duration::from_millis(30));
        session.stop_game();
        assert_eq!(session.registry().len(), 6);
    }

    #[test]
    fn failing_surface_does_not_stop_the_render_loop() {
        let mut session = session(CountingSurface {
            fail: true,
            ..CountingSurface::default()
        });
        session.start_game().unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(session.is_running());
        session.stop_game();

        assert!(session.surface().lock().frames > 1);
    }

    #[test]
    fn start_restarts_a_render_loop_that_died() {
        let mut session = session(CountingSurface {
            panic_once: true,
            ..CountingSurface::default()
        });
        session.start_game().unwrap();
        thread::sleep(Duration::from_millis(100));

        // The render thread is gone but the update loop keeps ticking.
        assert!(session.is_running());
        assert_eq!(session.surface().lock().frames, 0);

        session.start_game().unwrap();
        thread::sleep(Duration::from_millis(100));
        session.stop_game();

        assert!(session.surface().lock().frames > 0);
    }
}
