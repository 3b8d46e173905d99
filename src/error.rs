//! Fatal error taxonomy for the storage engine.
//!
//! Anything reaching a `DbError` is unrecoverable: the caller logs it and
//! exits. Recoverable, REPL-facing failures live in `statement.rs` and
//! `executor.rs` instead.

use thiserror::Error;

pub type DbResult<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("db file is not a whole number of pages; corrupt file")]
    CorruptFile,

    #[error("tried to fetch page number out of bounds: {page_num} >= {max}")]
    PageOutOfBounds { page_num: u32, max: u32 },

    #[error("Need to implement splitting internal node")]
    NeedInternalSplit,
}
