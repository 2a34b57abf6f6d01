//! Module for errors.
use crate::builder::Conflict;
use std::{error::Error, fmt::Display};

/// Error from building cubes.
#[derive(Debug)]
pub enum VolndErr {
    // Forwarded errors
    /// Database error from the SQLite input adapter.
    Database(::rusqlite::Error),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),

    // My own errors from this crate
    /// Two accepted records wrote different values into the same cell.
    Conflict(Box<Conflict>),
    /// A frozen seed contained a key of the wrong kind for its dimension.
    SeedMismatch {
        /// Name of the dimension being frozen.
        dimension: &'static str,
        /// Debug rendering of the offending key.
        key: String,
    },
    /// The dimension cannot be built from its name alone.
    InvalidDimension(String),
    /// A source row carried a value that cannot be used.
    InvalidValue(String),
    /// Bad interval parameters.
    InvalidInterval(&'static str),
    /// There was an internal logic error.
    LogicError(&'static str),
}

impl Display for VolndErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::VolndErr::*;

        match self {
            Database(err) => write!(f, "database error: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),

            Conflict(conflict) => write!(f, "{}", conflict),
            SeedMismatch { dimension, key } => {
                write!(f, "seed key {} does not belong to a {} axis", key, dimension)
            }
            InvalidDimension(name) => write!(f, "invalid dimension: {}", name),
            InvalidValue(msg) => write!(f, "invalid value: {}", msg),
            InvalidInterval(msg) => write!(f, "invalid interval: {}", msg),
            LogicError(msg) => write!(f, "internal logic error: {}", msg),
        }
    }
}

impl Error for VolndErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VolndErr::Database(err) => Some(err),
            VolndErr::StrumError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<::rusqlite::Error> for VolndErr {
    fn from(err: ::rusqlite::Error) -> VolndErr {
        VolndErr::Database(err)
    }
}

impl From<strum::ParseError> for VolndErr {
    fn from(err: strum::ParseError) -> VolndErr {
        VolndErr::StrumError(err)
    }
}

impl From<Conflict> for VolndErr {
    fn from(conflict: Conflict) -> VolndErr {
        VolndErr::Conflict(Box::new(conflict))
    }
}
