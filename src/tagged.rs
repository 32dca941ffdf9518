// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Storing 32-bit integers next to arbitrary values.
//!
//! A table of [`Payload`]s can hold both regular values and plain `u32`s.
//! Integer lookups report a missing key as [`NOT_FOUND`] (`u32::MAX`), so
//! that value, and `u32::MAX - 1` with it, can never be stored.

use crate::{Error, HashTable};

/// Returned by integer lookups when the key does not exist
pub const NOT_FOUND: u32 = u32::MAX;

/// Smallest integer that is rejected by [`HashTable::add_uint32_raw`]
pub const FIRST_RESERVED: u32 = u32::MAX - 1;

/// Value slot of a [`SymbolTable`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload<V> {
    /// Arbitrary caller value
    Value(V),

    /// Tagged integer
    Uint32(u32),
}

impl<V> Payload<V> {
    /// Returns the caller value, if this is not an integer.
    #[must_use]
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Self::Value(v) => Some(v),
            Self::Uint32(_) => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub fn as_uint32(&self) -> Option<u32> {
        match self {
            Self::Value(_) => None,
            Self::Uint32(n) => Some(*n),
        }
    }
}

/// Hash table that can store tagged integers
pub type SymbolTable<V = ()> = HashTable<Payload<V>>;

impl<V> HashTable<Payload<V>> {
    /// Stores an integer under a raw key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `u32::MAX - 1` and `u32::MAX`,
    /// without touching the table, or [`Error::OutOfMemory`] if an
    /// allocation fails.
    pub fn add_uint32_raw(
        &mut self,
        key: &[u8],
        namespace: Option<&str>,
        value: u32,
    ) -> crate::Result<()> {
        if value >= FIRST_RESERVED {
            return Err(Error::InvalidArgument);
        }

        self.add_raw(key, namespace, Payload::Uint32(value))
    }

    /// Returns the integer stored under a raw key.
    ///
    /// Returns [`NOT_FOUND`] if the key does not exist, or if its most
    /// recent entry is not an integer.
    #[must_use]
    pub fn lookup_uint32_raw(&self, key: &[u8], namespace: Option<&str>) -> u32 {
        self.lookup_raw(key, namespace)
            .and_then(Payload::as_uint32)
            .unwrap_or(NOT_FOUND)
    }

    /// Stores an integer under a string key, see [`HashTable::add_uint32_raw`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for the two reserved values, or
    /// [`Error::OutOfMemory`] if an allocation fails.
    pub fn add_uint32(&mut self, key: &str, namespace: Option<&str>, value: u32) -> crate::Result<()> {
        self.add_uint32_raw(key.as_bytes(), namespace, value)
    }

    /// Returns the integer stored under a string key, see [`HashTable::lookup_uint32_raw`].
    #[must_use]
    pub fn lookup_uint32(&self, key: &str, namespace: Option<&str>) -> u32 {
        self.lookup_uint32_raw(key.as_bytes(), namespace)
    }
}
