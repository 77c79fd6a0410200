//! Error handling for the crate. There are two halves to this, the [Status] taxonomy which is the
//! outcome of every socket transfer, and the [Error] type which is returned by the fallible buffer
//! and flag operations. Every [Error] maps onto exactly one [Status] via [Error::status], so that
//! callers mixing both APIs can reason about a single set of outcomes.

mod status;

use core::result;
use std::{collections::TryReserveError, io};

use thiserror::Error;

pub use status::Status;

/// A helper type for wrapping a [result::Result] such that we can reduce noise in our signatures.
pub type Result<T> = result::Result<T, Error>;

/// An error representing a failed buffer, bag, or flag operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("failed to allocate storage: {0}")]
    Alloc(
        #[from]
        #[source]
        TryReserveError,
    ),
    #[error("encountered unexpected IO error: {0}")]
    IO(
        #[from]
        #[source]
        io::Error,
    ),
    #[error("freeing function rejected the released storage")]
    Release,
}

impl Error {
    /// The [Status] this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidArgument(_) | Error::Release => Status::InvalidArgument,
            Error::Alloc(_) | Error::IO(_) => Status::Fatal,
        }
    }
}

impl From<nix::Error> for Error {
    fn from(value: nix::Error) -> Self {
        Self::IO(io::Error::from(value))
    }
}

impl From<&Error> for Status {
    fn from(value: &Error) -> Self {
        value.status()
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(value: &Result<T>) -> Self {
        match value {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}
