use std::error;
use std::fmt;

use crate::{options::OptionsError, syntax};

/// An error that occurred while building a matcher from a pattern.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The pattern is not valid. The wrapped error carries the char offset
    /// where parsing stopped.
    Syntax(syntax::Error),
    /// The starting options are an invalid combination. This is reported
    /// before the pattern is looked at.
    Options(OptionsError),
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn syntax(err: syntax::Error) -> Error {
        Error { kind: ErrorKind::Syntax(err) }
    }

    pub(crate) fn options(err: OptionsError) -> Error {
        Error { kind: ErrorKind::Options(err) }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind {
            ErrorKind::Syntax(ref err) => Some(err),
            ErrorKind::Options(ref err) => Some(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Syntax(ref err) => err.fmt(f),
            ErrorKind::Options(ref err) => err.fmt(f),
        }
    }
}

impl From<syntax::Error> for Error {
    fn from(err: syntax::Error) -> Error {
        Error::syntax(err)
    }
}

impl From<OptionsError> for Error {
    fn from(err: OptionsError) -> Error {
        Error::options(err)
    }
}
