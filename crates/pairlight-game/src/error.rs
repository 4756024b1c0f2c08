use thiserror::Error;

/// Errors surfaced by the game machine.
///
/// Only `reset()` (and machine construction, which performs the initial
/// reset) can fail; `scan()` handles everything it detects locally and logs
/// instead of propagating.
#[derive(Debug, Error)]
pub enum GameError {
    /// Persisted data could not be read.
    #[error(transparent)]
    Storage(#[from] pairlight_storage::StorageError),

    /// Domain validation failed.
    #[error(transparent)]
    Core(#[from] pairlight_core::Error),
}

/// Specialized result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
