// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::collections::TryReserveError;

/// Represents errors that can occur when operating on a hash table
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// An allocation for the table, an entry, a key or a namespace failed
    OutOfMemory,

    /// An argument was rejected before the table was touched
    ///
    /// Returned for a zero bucket count, or for one of the two reserved
    /// values when storing a tagged integer.
    InvalidArgument,

    /// Programmer error, such as operating on a table that does not exist
    InternalFatal,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NsTableError: {self:?}")
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Hash table result
pub type Result<T> = std::result::Result<T, Error>;
