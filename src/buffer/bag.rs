use std::fmt;

use slab::Slab;

use crate::error::{Error, Result};

use super::{allocate, free_with, release, Buffer};

/// A stable handle to a [Pocket] within a [Bag]. Handles carry the generation of the pocket they
/// were issued for, so a handle to a deleted pocket never resolves again even once its arena slot
/// has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PocketId {
    key: usize,
    generation: u64,
}

/// One independently allocated chunk of a [Bag], a pocket of size zero owns no storage.
pub struct Pocket {
    prev: Option<usize>,
    next: Option<usize>,
    generation: u64,
    storage: Option<Box<[u8]>>,
}

impl Pocket {
    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &[u8] {
        self.storage.as_deref().unwrap_or_default()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.storage.as_deref_mut().unwrap_or_default()
    }
}

impl fmt::Debug for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pocket")
            .field("size", &self.len())
            .field("generation", &self.generation)
            .finish()
    }
}

/// An ordered chain of [Pocket]s. Pockets live in a [Slab] arena and link to their neighbours by
/// arena key, appending and deleting are both O(1) and the chain order is independent of where a
/// pocket happens to sit in the arena.
#[derive(Default)]
pub struct Bag {
    pockets: Slab<Pocket>,
    head: Option<usize>,
    tail: Option<usize>,
    generation: u64,
}

impl Bag {
    pub fn new() -> Bag {
        Bag::default()
    }

    /// The number of pockets in the chain.
    pub fn len(&self) -> usize {
        self.pockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pockets.is_empty()
    }

    pub fn head(&self) -> Option<PocketId> {
        self.head.map(|key| self.id_of(key))
    }

    pub fn tail(&self) -> Option<PocketId> {
        self.tail.map(|key| self.id_of(key))
    }

    pub fn next(&self, id: PocketId) -> Option<PocketId> {
        self.resolve(id)?.next.map(|key| self.id_of(key))
    }

    pub fn prev(&self, id: PocketId) -> Option<PocketId> {
        self.resolve(id)?.prev.map(|key| self.id_of(key))
    }

    pub fn get(&self, id: PocketId) -> Option<&Pocket> {
        self.resolve(id)
    }

    pub fn get_mut(&mut self, id: PocketId) -> Option<&mut Pocket> {
        match self.pockets.get_mut(id.key) {
            Some(pocket) if pocket.generation == id.generation => Some(pocket),
            _ => None,
        }
    }

    /// Iterate over the pockets in chain order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            bag: self,
            at: self.head,
        }
    }

    /// Allocate a new pocket of `size` bytes and link it at the tail of the chain. Allocation
    /// failure leaves the bag unchanged.
    pub fn append(&mut self, size: usize) -> Result<PocketId> {
        let storage = allocate(size)?;
        Ok(self.link(storage))
    }

    /// Append a new pocket holding a copy of `buffer`'s bytes, the buffer is left untouched. An
    /// empty buffer yields a pocket without storage.
    pub fn place(&mut self, buffer: &Buffer) -> Result<PocketId> {
        let id = self.append(buffer.len())?;
        if let Some(pocket) = self.get_mut(id) {
            pocket.data_mut().copy_from_slice(buffer.as_slice());
        }
        Ok(id)
    }

    /// Unlink the pocket referenced by `slot` wherever it sits in the chain, handing its storage to
    /// `free` and clearing the reference. An absent or stale reference is an
    /// [Error::InvalidArgument] and leaves the bag unchanged.
    pub fn delete<F>(&mut self, slot: &mut Option<PocketId>, mut free: F) -> Result<()>
    where
        F: FnMut(Box<[u8]>) -> Result<()>,
    {
        let id = slot.ok_or(Error::InvalidArgument("pocket reference is absent"))?;
        let pocket = self.unlink(id)?;
        *slot = None;
        free_with(pocket.storage, &mut free)
    }

    /// Unlink the pocket `id` and return its storage to the caller.
    pub fn remove(&mut self, id: PocketId) -> Result<Option<Box<[u8]>>> {
        self.unlink(id).map(|pocket| pocket.storage)
    }

    /// Copy every pocket's bytes, in chain order, into a single new [Buffer]. The bag is not
    /// modified, and a bag with no bytes at all yields an empty [Buffer].
    pub fn flatten(&self) -> Result<Buffer> {
        let total = self.iter().map(Pocket::len).sum();
        let mut buffer = Buffer::zeroed(total)?;

        let mut offset = 0;
        let out = buffer.as_mut_slice();
        for pocket in self.iter() {
            let data = pocket.data();
            out[offset..offset + data.len()].copy_from_slice(data);
            offset += data.len();
        }
        Ok(buffer)
    }

    /// Destroy this bag, dropping every pocket's storage.
    pub fn destroy(self) -> Result<()> {
        self.destroy_with(release)
    }

    /// Destroy this bag, handing every pocket's storage to `free` from the tail to the head. Every
    /// pocket is released even if `free` fails for one of them, in which case [Error::Release] is
    /// returned.
    pub fn destroy_with<F>(mut self, mut free: F) -> Result<()>
    where
        F: FnMut(Box<[u8]>) -> Result<()>,
    {
        let mut result = Ok(());
        let mut at = self.tail;
        while let Some(key) = at {
            let pocket = self.pockets.remove(key);
            at = pocket.prev;
            if let Err(err) = free_with(pocket.storage, &mut free) {
                result = Err(err);
            }
        }
        result
    }

    fn id_of(&self, key: usize) -> PocketId {
        PocketId {
            key,
            generation: self.pockets[key].generation,
        }
    }

    fn resolve(&self, id: PocketId) -> Option<&Pocket> {
        self.pockets
            .get(id.key)
            .filter(|pocket| pocket.generation == id.generation)
    }

    fn link(&mut self, storage: Option<Box<[u8]>>) -> PocketId {
        self.generation += 1;
        let generation = self.generation;

        let key = self.pockets.insert(Pocket {
            prev: self.tail,
            next: None,
            generation,
            storage,
        });

        match self.tail {
            Some(tail) => self.pockets[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);

        PocketId { key, generation }
    }

    fn unlink(&mut self, id: PocketId) -> Result<Pocket> {
        if self.resolve(id).is_none() {
            return Err(Error::InvalidArgument("pocket does not belong to this bag"));
        }

        let pocket = self.pockets.remove(id.key);
        match pocket.prev {
            Some(prev) => self.pockets[prev].next = pocket.next,
            None => self.head = pocket.next,
        }
        match pocket.next {
            Some(next) => self.pockets[next].prev = pocket.prev,
            None => self.tail = pocket.prev,
        }
        Ok(pocket)
    }
}

impl fmt::Debug for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// An iterator over the [Pocket]s of a [Bag] in chain order.
pub struct Iter<'a> {
    bag: &'a Bag,
    at: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Pocket;

    fn next(&mut self) -> Option<Self::Item> {
        let bag = self.bag;
        let pocket = &bag.pockets[self.at?];
        self.at = pocket.next;
        Some(pocket)
    }
}
