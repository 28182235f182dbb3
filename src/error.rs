//! Uniform result type for the core. Every failure carries exactly one
//! identifier from the error taxonomy; nothing here knows about HTTP status
//! codes (see [`crate::http::error_response`] for that mapping).

use std::io;

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error taxonomy.
///
/// Host I/O failures are mapped onto this set by [`Error::from_io`];
/// anything that doesn't correspond to a specific condition becomes
/// [`Error::Io`] with a free-form detail string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed input, illegal name, out-of-range mode/size.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Permission denied, or an ownership-change request was refused.
    #[error("permission denied")]
    Access,

    /// No such file, directory or inode.
    #[error("no such entry")]
    NoEntry,

    /// Target was required to be a directory but wasn't.
    #[error("not a directory")]
    NotDir,

    /// Target must not be a directory.
    #[error("is a directory")]
    IsDir,

    /// Create collided with an existing entry.
    #[error("already exists")]
    Exist,

    /// rmdir was attempted on a non-empty directory.
    #[error("directory not empty")]
    NotEmpty,

    /// Mismatch between the backing store and the metadata store, or an
    /// unclassified host I/O failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Build an [`Error::InvalidArgument`] with a formatted message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Build an [`Error::Io`] carrying a free-form detail string, for
    /// mismatches discovered between the backing store and the metadata
    /// store (never silently reconciled — see the consistency protocol).
    pub fn mismatch(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    /// Map a host `io::Error` onto the closest taxonomy entry.
    pub fn from_io(err: io::Error) -> Self {
        use io::ErrorKind::*;
        match err.kind() {
            NotFound => Error::NoEntry,
            PermissionDenied => Error::Access,
            AlreadyExists => Error::Exist,
            InvalidInput | InvalidData => Error::InvalidArgument(err.to_string()),
            NotADirectory => Error::NotDir,
            IsADirectory => Error::IsDir,
            DirectoryNotEmpty => Error::NotEmpty,
            _ => Error::Io(err.to_string()),
        }
    }

    /// The identifier used in the wire response body.
    pub fn identifier(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "EINVAL",
            Error::Access => "EACCES",
            Error::NoEntry => "ENOENT",
            Error::NotDir => "ENOTDIR",
            Error::IsDir => "EISDIR",
            Error::Exist => "EEXIST",
            Error::NotEmpty => "ENOTEMPTY",
            Error::Io(_) => "EIO",
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::mismatch(err.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from_io(err)
    }
}
