//! Errors raised by palette mutations, formula evaluation and file I/O.
//!
//! Paint paths ([`Palette::get_color`](crate::Palette::get_color) and
//! friends) never return these: they fall back to a default color and
//! log.  Everything that changes a palette, or talks to the file
//! system, reports failures to the caller.

use std::path::PathBuf;
use thiserror::Error;

use crate::formula::EvalError;
use crate::palette::Channel;

#[derive(Error, Debug)]
pub enum Error {
    /// A value outside the accepted domain (model index, enum name, …).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A defined color could not be given a free key.
    #[error("defined color key {0} is already in use")]
    DuplicateKey(f64),

    #[error("index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A channel formula failed to evaluate.
    #[error("cannot evaluate {channel} function “{expression}”: {source}")]
    Eval {
        channel: Channel,
        expression: String,
        #[source]
        source: EvalError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
