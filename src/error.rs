//! Crate-wide error type

use crate::api::ApiError;
use crate::models::Weekday;
use crate::session::{SessionError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no business is loaded")]
    NoBusiness,

    #[error("schedule lists {0:?} more than once")]
    InvalidSchedule(Weekday),
}

impl Error {
    /// HTTP status of the underlying API failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
