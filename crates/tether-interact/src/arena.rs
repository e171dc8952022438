//! Generational arena storage for interaction objects.
//!
//! Participants and interactables reference each other across asynchronous
//! destruction (a peer can disconnect mid-network-round-trip), so neither
//! side may hold a direct reference to the other. Both are stored in arenas
//! and addressed by small generational handles: a slot's generation bumps on
//! removal, so a stale handle fails the liveness check instead of dangling.

use std::marker::PhantomData;

/// A typed generational handle into an [`Arena`].
pub trait ArenaHandle: Copy + Eq {
    /// Builds a handle from its raw slot index and generation.
    fn from_raw(index: u32, generation: u32) -> Self;
    /// Slot index.
    fn index(self) -> u32;
    /// Generation the handle was issued with.
    fn generation(self) -> u32;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot-reusing arena issuing generational handles of type `K`.
#[derive(Debug, Clone)]
pub struct Arena<K, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _key: PhantomData<K>,
}

impl<K: ArenaHandle, T> Arena<K, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }

    /// Inserts a value, reusing a freed slot when available.
    pub fn insert(&mut self, value: T) -> K {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            K::from_raw(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            K::from_raw(index, 0)
        }
    }

    /// Removes and returns the value behind a live handle. A stale or
    /// unknown handle is a no-op returning `None`.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index());
        self.len -= 1;
        Some(value)
    }

    /// Returns the value behind a live handle.
    pub fn get(&self, key: K) -> Option<&T> {
        let slot = self.slots.get(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Mutable access to the value behind a live handle.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Liveness check: `true` iff the handle still refers to a stored value.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates live `(handle, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (K::from_raw(index as u32, slot.generation), value))
        })
    }
}

impl<K: ArenaHandle, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
