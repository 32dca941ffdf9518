// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::entry::{Entry, EntryId, Slot};

/// Walks one bucket's chain, head to tail
pub struct Chain<'a, V> {
    slots: &'a [Slot<V>],
    cursor: Option<EntryId>,
}

impl<'a, V> Chain<'a, V> {
    pub fn new(slots: &'a [Slot<V>], head: Option<EntryId>) -> Self {
        Self {
            slots,
            cursor: head,
        }
    }
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (EntryId, &'a Entry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;

        let Some(entry) = self.slots.get(id).and_then(Slot::as_entry) else {
            debug_assert!(false, "chain should only link occupied slots");
            self.cursor = None;
            return None;
        };

        self.cursor = entry.next;
        Some((id, entry))
    }
}

/// Iterates over every entry of a table, bucket by bucket
pub struct Entries<'a, V> {
    heads: std::slice::Iter<'a, Option<EntryId>>,
    slots: &'a [Slot<V>],
    chain: Option<Chain<'a, V>>,
}

impl<'a, V> Entries<'a, V> {
    pub(crate) fn new(heads: &'a [Option<EntryId>], slots: &'a [Slot<V>]) -> Self {
        Self {
            heads: heads.iter(),
            slots,
            chain: None,
        }
    }
}

impl<'a, V> Iterator for Entries<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chain) = &mut self.chain {
                if let Some((_, entry)) = chain.next() {
                    return Some(entry);
                }
            }

            let head = self.heads.next()?;
            self.chain = Some(Chain::new(self.slots, *head));
        }
    }
}

/// Iterator over the entries of a single namespace
///
/// Created by [`HashTable::iter`](crate::HashTable::iter).
pub struct Iter<'a, V> {
    pub(crate) entries: Entries<'a, V>,
    pub(crate) namespace: Option<&'a str>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let namespace = self.namespace;

        self.entries
            .find(|entry| entry.in_namespace(namespace))
            .map(|entry| (entry.key.as_slice(), &entry.value))
    }
}

/// Iterator over all entries, regardless of namespace
///
/// Created by [`HashTable::iter_all`](crate::HashTable::iter_all).
pub struct IterAll<'a, V> {
    pub(crate) entries: Entries<'a, V>,
}

impl<'a, V> Iterator for IterAll<'a, V> {
    type Item = (&'a [u8], Option<&'a str>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries
            .next()
            .map(|entry| (entry.key.as_slice(), entry.namespace.as_deref(), &entry.value))
    }
}
