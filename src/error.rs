//! The error taxonomy shared by every layer of the driver.

use thiserror::Error;

/// Everything that can go wrong while mounting a volume or operating on an
/// open file or directory handle.
#[derive(Error, Debug)]
pub enum Error {
    /// A required handle or buffer was absent (e.g. a too-small read
    /// buffer passed to [`crate::fat::file::FileStream::read`]).
    #[error("bad argument: {0}")]
    BadArgument(&'static str),

    /// A path does not name the root directory, or a file name is absent
    /// from the root directory.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// A name resolved to a directory or volume-label entry where a file
    /// was expected.
    #[error("entry is a directory")]
    IsDir,

    /// A read or seek would cross the end of the disk, volume, or chain.
    #[error("out of range")]
    Range,

    /// The boot signature didn't match, the FAT copies disagree, or an
    /// unknown seek mode was requested.
    #[error("invalid data: {0}")]
    Invalid(&'static str),

    /// The underlying host read or seek failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal allocation would have to exceed a safety bound (see
    /// the cluster-chain cap in [`crate::fat::table`]).
    #[error("allocation bound exceeded: {0}")]
    NoMem(&'static str),
}

/// Result type alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
