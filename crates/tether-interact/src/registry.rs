//! Bookkeeping of interactable targets and their participant sets.
//!
//! All mutation is add-unique / remove-if-present: removing an absent
//! participant or adding a duplicate is a no-op, never an error. The
//! registry is intentionally policy-agnostic — invariant enforcement (such
//! as the Exclusive single-holder limit) belongs to the arbiter.

use crate::arena::Arena;
use crate::interactable::{Interactable, InteractableId, ParticipantId};

/// Arena-backed store of all live interactables.
#[derive(Debug, Clone, Default)]
pub struct InteractionRegistry {
    items: Arena<InteractableId, Interactable>,
}

impl InteractionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interactable (the owning object entered the simulation).
    pub fn insert(&mut self, item: Interactable) -> InteractableId {
        self.items.insert(item)
    }

    /// Unregisters an interactable (the owning object was destroyed).
    pub fn remove(&mut self, id: InteractableId) -> Option<Interactable> {
        self.items.remove(id)
    }

    /// Returns the interactable behind a live handle.
    pub fn get(&self, id: InteractableId) -> Option<&Interactable> {
        self.items.get(id)
    }

    /// Mutable access to the interactable behind a live handle.
    pub fn get_mut(&mut self, id: InteractableId) -> Option<&mut Interactable> {
        self.items.get_mut(id)
    }

    /// Liveness check for a handle.
    pub fn is_valid(&self, id: InteractableId) -> bool {
        self.items.contains(id)
    }

    /// Number of live interactables.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no interactables are registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates live `(id, interactable)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (InteractableId, &Interactable)> {
        self.items.iter()
    }

    /// Adds a participant to the active set. Returns `false` (no-op) for a
    /// duplicate or an invalid handle.
    pub fn add_active(&mut self, id: InteractableId, participant: ParticipantId) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if item.active.contains(&participant) {
            return false;
        }
        item.active.push(participant);
        true
    }

    /// Removes a participant from the active set. Returns `false` (no-op)
    /// when absent or invalid.
    pub fn remove_active(&mut self, id: InteractableId, participant: ParticipantId) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        let before = item.active.len();
        item.active.retain(|p| *p != participant);
        item.active.len() != before
    }

    /// Adds a participant to the hovering set (idempotent).
    pub fn add_hovering(&mut self, id: InteractableId, participant: ParticipantId) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if item.hovering.contains(&participant) {
            return false;
        }
        item.hovering.push(participant);
        true
    }

    /// Removes a participant from the hovering set (idempotent).
    pub fn remove_hovering(&mut self, id: InteractableId, participant: ParticipantId) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        let before = item.hovering.len();
        item.hovering.retain(|p| *p != participant);
        item.hovering.len() != before
    }

    /// Whether `participant` is actively engaged with `id`.
    pub fn is_active(&self, id: InteractableId, participant: ParticipantId) -> bool {
        self.items
            .get(id)
            .is_some_and(|item| item.active.contains(&participant))
    }

    /// Number of active participants (0 for an invalid handle).
    pub fn active_count(&self, id: InteractableId) -> usize {
        self.items.get(id).map_or(0, |item| item.active.len())
    }

    /// Whether `participant` is hovering over `id`.
    pub fn is_hovered(&self, id: InteractableId, participant: ParticipantId) -> bool {
        self.items
            .get(id)
            .is_some_and(|item| item.hovering.contains(&participant))
    }

    /// Active participants of `id` in engagement order (empty for an
    /// invalid handle).
    pub fn active_participants(&self, id: InteractableId) -> &[ParticipantId] {
        self.items.get(id).map_or(&[], |item| item.active.as_slice())
    }
}
