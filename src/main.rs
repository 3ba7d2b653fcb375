use std::{
    env,
    fs::File,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use pong_engine::{
    render::Overlay,
    terminal::{pump_events, KeyboardEnhancement, TerminalSurface},
    GameConfig, InputState, Key, PongError, PongResult, Session,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "pong_engine=info,pong=info";

/// The terminal belongs to the game, so logs go to a file.
fn init_logging() -> PongResult<()> {
    let path = env::var_os("PONG_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("pong.log"));
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| PongError::Logging(err.to_string()))?;

    info!(path = %path.display(), "logging started");
    Ok(())
}

fn register_controls(input: &InputState, quit: &Arc<AtomicBool>, overlay: &Arc<Overlay>) {
    for key in [Key::Esc, Key::Char('q')] {
        let quit = Arc::clone(quit);
        input.on_press(key, move || quit.store(true, Ordering::Release));
    }

    let overlay = Arc::clone(overlay);
    input.on_press(Key::Char('b'), move || {
        let shown = overlay.toggle_bounding_boxes();
        info!(shown, "bounding boxes toggled");
    });
}

fn main() -> PongResult<()> {
    init_logging()?;
    let config = GameConfig::from_env()?;
    let input = Arc::new(InputState::new());
    let quit = Arc::new(AtomicBool::new(false));

    let terminal = ratatui::init();
    let keyboard = KeyboardEnhancement::enable();
    let surface = TerminalSurface::new(terminal, config.field, config.theme.colors());

    let mut session = Session::new(config, surface, Arc::clone(&input));
    register_controls(&input, &quit, session.overlay());

    let result = session
        .start_game()
        .and_then(|()| pump_events(&input, &quit, keyboard.reports_releases()));

    session.stop_game();
    let score = session.score();
    drop(session);
    drop(keyboard);
    ratatui::restore();

    match &result {
        Ok(()) => {
            println!("Thanks for playing terminal.pong!");
            println!("Final Score: {} - {}", score.left, score.right);
        }
        Err(err) => eprintln!("Game ended with error: {err}"),
    }

    result
}
