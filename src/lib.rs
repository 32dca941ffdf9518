// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A fixed-size, namespace-scoped hash table for interning symbols.
//!
//! ##### About
//!
//! This crate exports a [`HashTable`] that maps arbitrary byte-string keys to
//! values, optionally partitioned into namespaces. It is meant to back the
//! symbol tables of a rule compiler: identifiers, pattern names and the like
//! are interned once and looked up many times.
//!
//! Keys are hashed with a seeded diffusion hash (see [`hash()`]), and the
//! namespace, if any, is folded into the same hash. The bucket count is chosen
//! up front and never changes, collisions are chained.
//!
//! Adding a key that already exists does not replace it; the newest entry
//! shadows the older ones until it is removed.
//!
//! ```
//! use nstable::{Config, Payload, SymbolTable};
//!
//! # fn main() -> nstable::Result<()> {
//! let mut table: SymbolTable<&str> = Config::new(16).create()?;
//!
//! table.add("foo", None, Payload::Value("global"))?;
//! table.add_uint32("foo", Some("rules"), 3)?;
//!
//! assert_eq!(Some(&Payload::Value("global")), table.lookup("foo", None));
//! assert_eq!(3, table.lookup_uint32("foo", Some("rules")));
//! assert_eq!(nstable::NOT_FOUND, table.lookup_uint32("bar", Some("rules")));
//! # Ok(())
//! # }
//! ```
//!
//! The table is not synchronized. Mutating methods take `&mut self`, so
//! sharing a table between threads requires an external lock.

#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::option_if_let_else)]
#![warn(clippy::redundant_feature_names)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

/// Configuration
pub mod config;

mod error;
mod hash;

/// Bounded string utilities
pub mod strutils;

mod table;
mod tagged;

pub use {
    config::Config,
    error::{Error, Result},
    hash::{bucket_index, hash},
    table::{iterate, HashTable, Iter, IterAll, Occupancy},
    tagged::{Payload, SymbolTable, FIRST_RESERVED, NOT_FOUND},
};
