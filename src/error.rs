use std::io;

use thiserror::Error;

/// Errors raised at the edges of the game: terminal, threads, configuration.
///
/// The simulation itself never fails; everything here comes from the
/// collaborators around it.
#[derive(Error, Debug)]
pub enum PongError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

pub type PongResult<T> = Result<T, PongError>;
