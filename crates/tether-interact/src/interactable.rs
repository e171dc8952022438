//! The interactable data model: one controllable affordance on a world
//! object, with its multi-participant policy and behavior variant.

use serde::{Deserialize, Serialize};
use tether_sync::{ObjectId, OwnerId};

use crate::arena::ArenaHandle;

/// Handle to an [`Interactable`] stored in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractableId {
    index: u32,
    generation: u32,
}

impl ArenaHandle for InteractableId {
    fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
    fn index(self) -> u32 {
        self.index
    }
    fn generation(self) -> u32 {
        self.generation
    }
}

/// Handle to a participant session stored in the session arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId {
    index: u32,
    generation: u32,
}

impl ArenaHandle for ParticipantId {
    fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
    fn index(self) -> u32 {
        self.index
    }
    fn generation(self) -> u32 {
        self.generation
    }
}

impl ParticipantId {
    /// The network-authority owner identity for this participant, used when
    /// ownership of an engaged object migrates to its session.
    pub fn owner_id(self) -> OwnerId {
        OwnerId(((self.generation as u64) << 32) | self.index as u64)
    }
}

/// Multi-participant engagement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagePolicy {
    /// At most one active participant; further requests are refused.
    Exclusive,
    /// Any number of participants may hold the interactable together.
    Shared,
    /// A new engagement evicts the current holder(s) instead of failing.
    Preemptive,
}

/// Behavior variant dispatched on engage/disengage. Keeps arbitration fully
/// decoupled from behavior-specific logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InteractableKind {
    /// Momentary control: engagement auto-releases after `reset_after`
    /// seconds via the deferred-task queue.
    Trigger {
        /// Seconds until the automatic disengage fires.
        reset_after: f32,
    },
    /// Latching control: each engagement flips the stored state.
    Toggle {
        /// Current latched state.
        on: bool,
    },
    /// Sustained control held until explicit disengagement.
    Hold,
    /// Physical grab: holding it drives the owning object's interacted
    /// replication cadence.
    Grab,
}

/// One controllable affordance on a world object.
///
/// The active/hovering sets are mutated only through the registry's
/// idempotent operations; policy enforcement (e.g. the Exclusive holder
/// limit) is the arbiter's job, never the data model's.
#[derive(Debug, Clone)]
pub struct Interactable {
    /// Resolution priority; lower resolves first.
    pub priority: u8,
    /// Multi-participant policy.
    pub policy: EngagePolicy,
    /// Whether remote (laser) engagement is permitted.
    pub laser_eligible: bool,
    /// Administratively enabled. Disabled interactables are filtered out of
    /// arbitration but keep their state.
    pub enabled: bool,
    /// Behavior variant.
    pub kind: InteractableKind,
    /// The physically simulated object this affordance controls, if any.
    pub object: Option<ObjectId>,
    pub(crate) active: Vec<ParticipantId>,
    pub(crate) hovering: Vec<ParticipantId>,
}

impl Interactable {
    /// Creates an enabled, laser-eligible interactable with empty
    /// participant sets.
    pub fn new(priority: u8, policy: EngagePolicy, kind: InteractableKind) -> Self {
        Self {
            priority,
            policy,
            laser_eligible: true,
            enabled: true,
            kind,
            object: None,
            active: Vec::new(),
            hovering: Vec::new(),
        }
    }

    /// Associates the affordance with its owning world object.
    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = Some(object);
        self
    }

    /// Forbids remote (laser) engagement.
    pub fn contact_only(mut self) -> Self {
        self.laser_eligible = false;
        self
    }

    /// Participants currently engaged, in engagement order.
    pub fn active_participants(&self) -> &[ParticipantId] {
        &self.active
    }

    /// Participants currently hovering.
    pub fn hovering_participants(&self) -> &[ParticipantId] {
        &self.hovering
    }
}
