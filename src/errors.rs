//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the catalog interface.
#[derive(Debug)]
pub enum WxCatalogErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Database error
    Database(::rusqlite::Error),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),

    // My own errors from this crate
    /// File not found in the index.
    NotInIndex,
    /// The database structure is wrong.
    InvalidSchema,
    /// A file with the wrong extension was passed to a type-specific indexing operation.
    WrongFileType(String),
}

impl Display for WxCatalogErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::WxCatalogErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            Database(err) => write!(f, "database error: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),

            NotInIndex => write!(f, "no match in the index"),
            InvalidSchema => write!(f, "invalid index format"),
            WrongFileType(msg) => write!(f, "wrong file type: {}", msg),
        }
    }
}

impl Error for WxCatalogErr {}

impl From<::std::io::Error> for WxCatalogErr {
    fn from(err: ::std::io::Error) -> WxCatalogErr {
        WxCatalogErr::IO(err)
    }
}

impl From<::rusqlite::Error> for WxCatalogErr {
    fn from(err: ::rusqlite::Error) -> WxCatalogErr {
        WxCatalogErr::Database(err)
    }
}

impl From<strum::ParseError> for WxCatalogErr {
    fn from(err: strum::ParseError) -> WxCatalogErr {
        WxCatalogErr::StrumError(err)
    }
}
