use sea_orm::{DbErr, SqlErr};

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a failed domain operation. The server maps each variant to an
/// HTTP status and a `{message}` body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// The record would duplicate an existing one
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    /// Turns a unique-constraint violation raised by the engine into a
    /// `Conflict` carrying `message`; any other storage error passes through.
    pub fn from_insert(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                log::debug!("unique constraint rejected insert: {detail}");
                Error::conflict(message)
            }
            _ => Error::Storage(err),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Conflict(_) | Error::NotFound(_)
        )
    }
}
