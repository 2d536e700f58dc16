use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("cell closed while waiting")]
    Closed,
}

pub type QueueResult<T> = Result<T, QueueError>;
