//! Priority-based interaction arbitration: interactable targets, participant
//! sessions, and the bounded priority search that decides which single
//! target an engage/disengage request resolves to.
//!
//! Arbitration is stateless and policy-driven; the registry holds the
//! engagement bookkeeping, and the session manager orchestrates the full
//! lifecycle including ownership transfer of engaged objects and deferred
//! trigger resets.

pub mod arbiter;
pub mod arena;
pub mod interactable;
pub mod registry;
pub mod schedule;
pub mod session;

pub use arbiter::{SelectMode, resolve_disengage, resolve_engage};
pub use arena::{Arena, ArenaHandle};
pub use interactable::{
    EngagePolicy, Interactable, InteractableId, InteractableKind, ParticipantId,
};
pub use registry::InteractionRegistry;
pub use schedule::TaskQueue;
pub use session::{InteractionEvent, InteractorSession, SessionManager};
