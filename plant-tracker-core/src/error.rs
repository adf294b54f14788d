use thiserror::Error;

/// Failures surfaced by the registries and the occupancy ledger.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stored value: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        // Row mappers smuggle our own errors through rusqlite; unwrap them here.
        match err {
            rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => {
                match source.downcast::<Error>() {
                    Ok(inner) => *inner,
                    Err(source) => Error::Database(rusqlite::Error::FromSqlConversionFailure(
                        idx, ty, source,
                    )),
                }
            }
            other => Error::Database(other),
        }
    }
}

impl Error {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }
}

/// Reject blank required text fields, returning the trimmed value.
pub(crate) fn require(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
