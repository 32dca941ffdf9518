// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{Error, HashTable};

/// Bucket count used when none is configured
///
/// This is the prime the reference rule compiler sizes its symbol tables with.
pub const DEFAULT_BUCKET_COUNT: usize = 10_007;

/// Hash table configuration builder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of buckets, fixed for the lifetime of the table
    #[doc(hidden)]
    pub bucket_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

impl Config {
    /// Initializes a new config
    #[must_use]
    pub fn new(bucket_count: usize) -> Self {
        Self { bucket_count }
    }

    /// Sets the number of buckets.
    ///
    /// Tables never grow, so this should be chosen with the expected
    /// number of entries in mind.
    ///
    /// Default = 10007
    #[must_use]
    pub fn bucket_count(mut self, n: usize) -> Self {
        self.bucket_count = n;
        self
    }

    /// Creates an empty hash table with the configured bucket count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the bucket count is zero,
    /// or [`Error::OutOfMemory`] if the buckets cannot be allocated.
    pub fn create<V>(&self) -> crate::Result<HashTable<V>> {
        if self.bucket_count == 0 {
            log::debug!("Refusing to create a hash table without buckets");
            return Err(Error::InvalidArgument);
        }

        HashTable::create(self.bucket_count)
    }
}
