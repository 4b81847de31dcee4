// errors.rs
use crate::domain::site::Stage;
use std::fmt;

/// Errors originating from the board operations themselves
/// (bad indexes, immutable stages) or downstream layers (DB, xlsx, mailer).
///
/// A market resolution miss is deliberately NOT in here — it is a normal
/// outcome of the resolver (`Option::None`), never a failure.
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    /// Index does not address an existing record in the named stage.
    OutOfRange { stage: Stage, index: usize },
    /// Mutation attempted on a record outside the Ongoing stage.
    InvalidStage(Stage),
    /// Field name is unknown, or names a derived field (those are read-only).
    UnknownField(String),
    DbError(String),
    XlsxError(String),
    MailerError(String),
    InternalError,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::OutOfRange { stage, index } => {
                write!(f, "No record at index {index} in {stage} stage")
            }
            ServerError::InvalidStage(stage) => {
                write!(f, "Records in {stage} stage are immutable")
            }
            ServerError::UnknownField(name) => write!(f, "Unknown or read-only field: {name}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Xlsx Error: {msg}"),
            ServerError::MailerError(msg) => write!(f, "Mailer Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<rusqlite::Error> for ServerError {
    fn from(err: rusqlite::Error) -> Self {
        ServerError::DbError(err.to_string())
    }
}
