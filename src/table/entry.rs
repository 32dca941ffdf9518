// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

#[cfg(test)]
use std::cell::Cell;

/// Position of an entry inside the table's slot arena
pub type EntryId = usize;

/// A single key-value pair, linked into its bucket's chain
pub struct Entry<V> {
    pub key: Vec<u8>,

    /// `None` is the default (unscoped) namespace
    pub namespace: Option<String>,

    pub value: V,

    /// Next entry in the same bucket
    pub next: Option<EntryId>,
}

impl<V> Entry<V> {
    /// Copies `key` and `namespace` into owned buffers.
    ///
    /// Nothing is left allocated if any of the copies fails.
    pub fn try_new(
        key: &[u8],
        namespace: Option<&str>,
        value: V,
        next: Option<EntryId>,
    ) -> crate::Result<Self> {
        let mut owned_key = Vec::new();
        alloc_point()?;
        owned_key.try_reserve_exact(key.len())?;
        owned_key.extend_from_slice(key);

        let namespace = match namespace {
            Some(ns) => {
                let mut owned = String::new();
                alloc_point()?;
                owned.try_reserve_exact(ns.len())?;
                owned.push_str(ns);
                Some(owned)
            }
            None => None,
        };

        Ok(Self {
            key: owned_key,
            namespace,
            value,
            next,
        })
    }

    /// Both namespaces absent, or both present and equal.
    pub fn in_namespace(&self, namespace: Option<&str>) -> bool {
        self.namespace.as_deref() == namespace
    }

    pub fn matches(&self, key: &[u8], namespace: Option<&str>) -> bool {
        self.key == key && self.in_namespace(namespace)
    }

    /// Heap bytes owned by the entry itself (not counting the value)
    pub fn heap_size(&self) -> usize {
        self.key.capacity() + self.namespace.as_ref().map_or(0, String::capacity)
    }
}

#[cfg(test)]
thread_local! {
    static FAIL_ALLOC_IN: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Makes the allocation site reached after `n` successful ones fail
/// with [`crate::Error::OutOfMemory`], on the current thread only.
#[cfg(test)]
pub fn fail_alloc_after(n: Option<usize>) {
    FAIL_ALLOC_IN.with(|cell| cell.set(n));
}

/// Called before every fallible allocation of the table.
#[cfg(test)]
pub fn alloc_point() -> crate::Result<()> {
    FAIL_ALLOC_IN.with(|cell| match cell.get() {
        Some(0) => {
            cell.set(None);
            Err(crate::Error::OutOfMemory)
        }
        Some(n) => {
            cell.set(Some(n - 1));
            Ok(())
        }
        None => Ok(()),
    })
}

#[cfg(not(test))]
#[inline]
#[allow(clippy::unnecessary_wraps)]
pub fn alloc_point() -> crate::Result<()> {
    Ok(())
}

/// Arena slot
pub enum Slot<V> {
    Occupied(Entry<V>),

    /// Free slot, linked to the next free slot
    Vacant(Option<EntryId>),
}

impl<V> Slot<V> {
    pub fn as_entry(&self) -> Option<&Entry<V>> {
        match self {
            Self::Occupied(entry) => Some(entry),
            Self::Vacant(_) => None,
        }
    }

    pub fn as_entry_mut(&mut self) -> Option<&mut Entry<V>> {
        match self {
            Self::Occupied(entry) => Some(entry),
            Self::Vacant(_) => None,
        }
    }
}
