// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

mod entry;
mod iter;


pub use iter::{Iter, IterAll};

use crate::{hash::bucket_index, Error};
use entry::{alloc_point, Entry, EntryId, Slot};
use iter::{Chain, Entries};

/// A fixed-size hash table keyed by byte strings and an optional namespace
///
/// Collisions are resolved by chaining. Entries live in a slot arena;
/// bucket heads and chain links are slot indexes, and freed slots are
/// recycled by later inserts.
///
/// The bucket count is chosen at creation and never changes.
///
/// Inserting a `(key, namespace)` pair that already exists does not
/// replace the old entry: the new entry shadows it, and removing the new
/// entry makes the old one visible again.
pub struct HashTable<V> {
    /// Chain head per bucket
    buckets: Box<[Option<EntryId>]>,

    slots: Vec<Slot<V>>,

    /// Head of the free slot list
    free_head: Option<EntryId>,

    len: usize,
}

/// Bucket usage figures, see [`HashTable::occupancy`]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Number of buckets with at least one entry
    pub used_buckets: usize,

    /// Length of the longest chain
    pub longest_chain: usize,
}

impl<V> HashTable<V> {
    /// Creates a table with exactly `bucket_count` empty buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `bucket_count` is zero,
    /// or [`Error::OutOfMemory`] if the buckets cannot be allocated.
    pub fn create(bucket_count: usize) -> crate::Result<Self> {
        if bucket_count == 0 {
            return Err(Error::InvalidArgument);
        }

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count)?;
        buckets.resize(bucket_count, None);

        log::debug!("Created hash table with {bucket_count} buckets");

        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            slots: Vec::new(),
            free_head: None,
            len: 0,
        })
    }

    /// Returns the (fixed) number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of stored entries, shadowed duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bucket a key lands in.
    #[must_use]
    pub fn bucket_index(&self, key: &[u8], namespace: Option<&str>) -> usize {
        bucket_index(key, namespace, self.bucket_count())
    }

    fn head(&self, bucket: usize) -> Option<EntryId> {
        self.buckets.get(bucket).copied().flatten()
    }

    fn chain(&self, bucket: usize) -> Chain<'_, V> {
        Chain::new(&self.slots, self.head(bucket))
    }

    fn entries(&self) -> Entries<'_, V> {
        Entries::new(&self.buckets, &self.slots)
    }

    /// Returns the value of the most recently added entry for `key` in `namespace`.
    #[must_use]
    pub fn lookup_raw(&self, key: &[u8], namespace: Option<&str>) -> Option<&V> {
        let bucket = self.bucket_index(key, namespace);

        self.chain(bucket)
            .find(|(_, entry)| entry.matches(key, namespace))
            .map(|(_, entry)| &entry.value)
    }

    /// Like [`HashTable::lookup_raw`], but returns a mutable reference.
    #[must_use]
    pub fn lookup_raw_mut(&mut self, key: &[u8], namespace: Option<&str>) -> Option<&mut V> {
        let bucket = self.bucket_index(key, namespace);

        let (id, _) = self
            .chain(bucket)
            .find(|(_, entry)| entry.matches(key, namespace))?;

        self.slots
            .get_mut(id)
            .and_then(Slot::as_entry_mut)
            .map(|entry| &mut entry.value)
    }

    /// Adds a new entry at the head of its bucket's chain.
    ///
    /// Existing entries with the same key and namespace are not checked
    /// for, so the new value shadows any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the entry or its key or namespace
    /// copies cannot be allocated. The table is left unchanged in that case.
    pub fn add_raw(&mut self, key: &[u8], namespace: Option<&str>, value: V) -> crate::Result<()> {
        let bucket = self.bucket_index(key, namespace);

        // Reserve before building the entry, so a failure leaves nothing behind
        if self.free_head.is_none() {
            alloc_point()?;
            self.slots.try_reserve(1)?;
        }

        let entry = Entry::try_new(key, namespace, value, self.head(bucket))?;
        let id = self.occupy(entry);

        let Some(head) = self.buckets.get_mut(bucket) else {
            return Err(Error::InternalFatal);
        };
        *head = Some(id);

        self.len += 1;

        Ok(())
    }

    /// Places an entry into a free slot, or a new one, and returns its id.
    fn occupy(&mut self, entry: Entry<V>) -> EntryId {
        if let Some(id) = self.free_head {
            if let Some(slot) = self.slots.get_mut(id) {
                if let Slot::Vacant(next_free) = *slot {
                    self.free_head = next_free;
                    *slot = Slot::Occupied(entry);
                    return id;
                }
            }

            debug_assert!(false, "free list should only link vacant slots");
        }

        let id = self.slots.len();
        self.slots.push(Slot::Occupied(entry));
        id
    }

    /// Marks a slot as free and hands back the entry it held.
    fn vacate(&mut self, id: EntryId) -> Option<Entry<V>> {
        let slot = self.slots.get_mut(id)?;

        match std::mem::replace(slot, Slot::Vacant(self.free_head)) {
            Slot::Occupied(entry) => {
                self.free_head = Some(id);
                self.len -= 1;
                Some(entry)
            }
            vacant @ Slot::Vacant(_) => {
                *slot = vacant;
                None
            }
        }
    }

    /// Unlinks the most recently added entry for `key` in `namespace`
    /// and returns its value.
    ///
    /// Removing a key that does not exist returns `None`.
    pub fn remove_raw(&mut self, key: &[u8], namespace: Option<&str>) -> Option<V> {
        let bucket = self.bucket_index(key, namespace);

        let mut prev = None;
        let mut found = None;

        for (id, entry) in self.chain(bucket) {
            if entry.matches(key, namespace) {
                found = Some((id, entry.next));
                break;
            }
            prev = Some(id);
        }

        let (id, next) = found?;

        match prev {
            None => {
                *self.buckets.get_mut(bucket)? = next;
            }
            Some(prev) => {
                self.slots.get_mut(prev)?.as_entry_mut()?.next = next;
            }
        }

        self.vacate(id).map(|entry| entry.value)
    }

    /// Returns the value for a string key, see [`HashTable::lookup_raw`].
    #[must_use]
    pub fn lookup(&self, key: &str, namespace: Option<&str>) -> Option<&V> {
        self.lookup_raw(key.as_bytes(), namespace)
    }

    /// Adds an entry under a string key, see [`HashTable::add_raw`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if an allocation fails.
    pub fn add(&mut self, key: &str, namespace: Option<&str>, value: V) -> crate::Result<()> {
        self.add_raw(key.as_bytes(), namespace, value)
    }

    /// Removes an entry under a string key, see [`HashTable::remove_raw`].
    pub fn remove(&mut self, key: &str, namespace: Option<&str>) -> Option<V> {
        self.remove_raw(key.as_bytes(), namespace)
    }

    /// Iterates over the entries of `namespace`, passing each to `visit`.
    ///
    /// Entries are visited in bucket order, and head to tail within a
    /// bucket. Passing `None` only visits entries without a namespace.
    ///
    /// # Errors
    ///
    /// The first error returned by `visit` stops the iteration and is
    /// returned as-is. Entries visited before it are not revisited.
    pub fn iterate<E, F>(&self, namespace: Option<&str>, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&[u8], &V) -> Result<(), E>,
    {
        for (key, value) in self.iter(namespace) {
            visit(key, value)?;
        }
        Ok(())
    }

    /// Returns an iterator over the `(key, value)` pairs of `namespace`,
    /// in the same order as [`HashTable::iterate`].
    #[must_use]
    pub fn iter<'a>(&'a self, namespace: Option<&'a str>) -> Iter<'a, V> {
        Iter {
            entries: self.entries(),
            namespace,
        }
    }

    /// Returns an iterator over all `(key, namespace, value)` triples.
    #[must_use]
    pub fn iter_all(&self) -> IterAll<'_, V> {
        IterAll {
            entries: self.entries(),
        }
    }

    /// Removes all entries, dropping their values.
    ///
    /// The buckets are kept, so the table can be reused.
    pub fn clean(&mut self) {
        self.clean_with(drop);
    }

    /// Removes all entries, passing each value to `destructor` first.
    ///
    /// Values are handed over in bucket order, head to tail within a bucket.
    ///
    /// If `destructor` panics, the table is still left empty; the values
    /// not yet handed over are dropped.
    pub fn clean_with<F: FnMut(V)>(&mut self, mut destructor: F) {
        let count = self.len;

        let mut guard = ResetOnDrop(self);
        let Self { buckets, slots, .. } = &mut *guard.0;

        for head in &mut **buckets {
            let mut cursor = head.take();

            while let Some(id) = cursor {
                let Some(slot) = slots.get_mut(id) else {
                    break;
                };

                match std::mem::replace(slot, Slot::Vacant(None)) {
                    Slot::Occupied(entry) => {
                        cursor = entry.next;
                        destructor(entry.value);
                    }
                    Slot::Vacant(_) => break,
                }
            }
        }

        drop(guard);

        log::trace!("Cleaned {count} entries from hash table");
    }

    /// Removes all entries and releases the table.
    pub fn destroy(self) {
        self.destroy_with(drop);
    }

    /// Removes all entries, passing each value to `destructor`, then
    /// releases the table.
    pub fn destroy_with<F: FnMut(V)>(mut self, destructor: F) {
        self.clean_with(destructor);
        log::debug!("Destroyed hash table with {} buckets", self.bucket_count());
    }

    /// Returns how evenly the entries are spread over the buckets.
    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        (0..self.bucket_count())
            .map(|bucket| self.chain(bucket).count())
            .filter(|&len| len > 0)
            .fold(Occupancy::default(), |acc, len| Occupancy {
                used_buckets: acc.used_buckets + 1,
                longest_chain: acc.longest_chain.max(len),
            })
    }

    /// Approximate number of heap bytes used by the table.
    ///
    /// Values are only counted by their inline size.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        let buckets = self.buckets.len() * std::mem::size_of::<Option<EntryId>>();
        let slots = self.slots.capacity() * std::mem::size_of::<Slot<V>>();
        let keys: usize = self.entries().map(Entry::heap_size).sum();

        buckets + slots + keys
    }
}

impl<V> std::fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashTable")
            .field("bucket_count", &self.bucket_count())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Iterates over `table`, see [`HashTable::iterate`].
///
/// This is the entry point for callers that hold a table that may not
/// have been created yet.
///
/// # Errors
///
/// Returns [`Error::InternalFatal`] if there is no table, otherwise the
/// first error returned by `visit`.
pub fn iterate<V, E, F>(table: Option<&HashTable<V>>, namespace: Option<&str>, visit: F) -> Result<(), E>
where
    E: From<Error>,
    F: FnMut(&[u8], &V) -> Result<(), E>,
{
    let Some(table) = table else {
        log::debug!("Tried to iterate over a missing hash table");
        return Err(Error::InternalFatal.into());
    };

    table.iterate(namespace, visit)
}

/// Empties a table when dropped, also while unwinding out of a destructor
struct ResetOnDrop<'a, V>(&'a mut HashTable<V>);

impl<V> Drop for ResetOnDrop<'_, V> {
    fn drop(&mut self) {
        let table = &mut *self.0;

        for head in &mut *table.buckets {
            *head = None;
        }
        table.slots.clear();
        table.free_head = None;
        table.len = 0;
    }
}
