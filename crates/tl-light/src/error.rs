use thiserror::Error;
use tl_core::{CoreError, LightId};

#[derive(Debug, Error)]
pub enum LightError {
    #[error("light configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("{0} is already cycling")]
    AlreadyRunning(LightId),

    #[error("{0} has been stopped")]
    Stopped(LightId),

    #[error("worker thread of {0} panicked")]
    WorkerPanicked(LightId),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type LightResult<T> = Result<T, LightError>;
