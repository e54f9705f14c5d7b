// Error taxonomy shared by the library, the CLI and the HTTP layer

use crate::entities::BudgetType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range field; nothing was written
    #[error("validation failed: {0}")]
    Validation(String),

    /// Entry references an author id that does not exist; nothing was written
    #[error("author {0} does not exist")]
    UnknownAuthor(i64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("import failed at row {row}: {source}")]
    Import {
        row: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Per-type sum of a year does not fit in i64
    #[error("{0} total overflows a 64-bit amount")]
    SumOverflow(BudgetType),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// True for errors caused by the caller's input rather than the storage layer
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Validation(_) | Error::UnknownAuthor(_) => true,
            Error::Import { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
