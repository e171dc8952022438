//! Participant sessions: the per-actor state machine orchestrating
//! arbitration, registry bookkeeping, ownership transfer, and the
//! engagement lifecycle events consumed by rendering/audio collaborators.
//!
//! Every public operation is idempotent against repeated calls with no
//! eligible target: invalid handles, policy refusals, and arbitration misses
//! all degrade to a silent no-op this tick.

use tether_config::ArbiterConfig;
use tether_sync::OwnershipLedger;

use crate::arbiter::{SelectMode, resolve_disengage, resolve_engage};
use crate::arena::Arena;
use crate::interactable::{EngagePolicy, InteractableId, InteractableKind, ParticipantId};
use crate::registry::InteractionRegistry;
use crate::schedule::TaskQueue;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Engagement lifecycle notifications emitted toward collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// A participant began engaging a target.
    EngageStarted {
        /// The engaged interactable.
        target: InteractableId,
        /// The engaging participant.
        participant: ParticipantId,
    },
    /// A participant's engagement ended (explicit, preempted, or deferred).
    EngageEnded {
        /// The released interactable.
        target: InteractableId,
        /// The participant whose engagement ended.
        participant: ParticipantId,
    },
    /// A participant's hover state over a target changed.
    HoverChanged {
        /// The hovered interactable.
        target: InteractableId,
        /// The hovering participant.
        participant: ParticipantId,
        /// New hover state.
        hovering: bool,
    },
}

// ---------------------------------------------------------------------------
// InteractorSession
// ---------------------------------------------------------------------------

/// One networked actor's capability to engage interactables.
#[derive(Debug, Clone)]
pub struct InteractorSession {
    /// Whether this session is driven by local input.
    pub locally_controlled: bool,
    /// Remote (laser) engagement mode, checked against `laser_eligible`.
    pub laser_mode: bool,
    active_targets: Vec<InteractableId>,
    arbitration_misses: u64,
}

impl InteractorSession {
    /// Currently engaged targets in engagement order.
    pub fn active_targets(&self) -> &[InteractableId] {
        &self.active_targets
    }

    /// Number of engage/disengage requests that resolved to no target.
    /// The primary signal of priority/policy mis-tuning.
    pub fn arbitration_misses(&self) -> u64 {
        self.arbitration_misses
    }
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Arena-backed store of participant sessions plus the orchestration entry
/// points the authoritative timeline drives.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arena<ParticipantId, InteractorSession>,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session, returning its handle.
    pub fn create(&mut self, locally_controlled: bool, laser_mode: bool) -> ParticipantId {
        let id = self.sessions.insert(InteractorSession {
            locally_controlled,
            laser_mode,
            active_targets: Vec::new(),
            arbitration_misses: 0,
        });
        tracing::info!(participant = ?id, locally_controlled, "session started");
        id
    }

    /// Returns the session behind a live handle.
    pub fn get(&self, id: ParticipantId) -> Option<&InteractorSession> {
        self.sessions.get(id)
    }

    /// Liveness check for a session handle.
    pub fn is_valid(&self, id: ParticipantId) -> bool {
        self.sessions.contains(id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Resolves and engages one target from `candidates` (supplied by the
    /// spatial-overlap collaborator). On success the target's owning object
    /// migrates to this participant's authority and the behavior variant is
    /// dispatched. Returns the engaged target, or `None` on a miss.
    #[allow(clippy::too_many_arguments)]
    pub fn request_engage(
        &mut self,
        participant: ParticipantId,
        registry: &mut InteractionRegistry,
        ledger: &mut OwnershipLedger,
        tasks: &mut TaskQueue,
        candidates: &[InteractableId],
        priority: u8,
        mode: SelectMode,
        config: &ArbiterConfig,
        events: &mut Vec<InteractionEvent>,
    ) -> Option<InteractableId> {
        let laser_mode = self.sessions.get(participant)?.laser_mode;

        let Some(target) = resolve_engage(
            registry,
            candidates,
            participant,
            laser_mode,
            priority,
            mode,
            config.max_search_depth,
        ) else {
            if let Some(session) = self.sessions.get_mut(participant) {
                session.arbitration_misses += 1;
            }
            return None;
        };

        // Preemption: evict current holders before the new grant. A forced
        // transition, not a negotiated one.
        let preemptive = registry
            .get(target)
            .is_some_and(|item| item.policy == EngagePolicy::Preemptive);
        if preemptive {
            for holder in registry.active_participants(target).to_vec() {
                self.force_disengage(target, holder, registry, ledger, events);
            }
        }

        registry.add_active(target, participant);
        if let Some(session) = self.sessions.get_mut(participant) {
            session.active_targets.push(target);
        }

        if let Some(object) = registry.get(target).and_then(|item| item.object) {
            ledger.grant(object, participant.owner_id());
        }

        match registry.get_mut(target).map(|item| &mut item.kind) {
            Some(InteractableKind::Trigger { reset_after }) => {
                let delay = *reset_after;
                tasks.schedule(target, participant, delay);
            }
            Some(InteractableKind::Toggle { on }) => *on = !*on,
            _ => {}
        }

        tracing::debug!(?target, ?participant, "engagement started");
        events.push(InteractionEvent::EngageStarted {
            target,
            participant,
        });
        Some(target)
    }

    /// Resolves and disengages one held target from `candidates` (typically
    /// the targets active on the currently-engaged object). Returns the
    /// released target, or `None` on a miss.
    #[allow(clippy::too_many_arguments)]
    pub fn request_disengage(
        &mut self,
        participant: ParticipantId,
        registry: &mut InteractionRegistry,
        ledger: &mut OwnershipLedger,
        candidates: &[InteractableId],
        priority: u8,
        mode: SelectMode,
        config: &ArbiterConfig,
        events: &mut Vec<InteractionEvent>,
    ) -> Option<InteractableId> {
        if !self.sessions.contains(participant) {
            return None;
        }

        let Some(target) = resolve_disengage(
            registry,
            candidates,
            participant,
            priority,
            mode,
            config.max_search_depth,
        ) else {
            if let Some(session) = self.sessions.get_mut(participant) {
                session.arbitration_misses += 1;
            }
            return None;
        };

        self.force_disengage(target, participant, registry, ledger, events);
        Some(target)
    }

    /// Ends `(target, participant)` engagement unconditionally. Idempotent:
    /// returns `false` without effect when the pair is not engaged. Releases
    /// object authority back to the neutral owner when the last holder left.
    pub fn force_disengage(
        &mut self,
        target: InteractableId,
        participant: ParticipantId,
        registry: &mut InteractionRegistry,
        ledger: &mut OwnershipLedger,
        events: &mut Vec<InteractionEvent>,
    ) -> bool {
        if !registry.is_active(target, participant) {
            return false;
        }
        registry.remove_active(target, participant);
        if let Some(session) = self.sessions.get_mut(participant) {
            session.active_targets.retain(|t| *t != target);
        }

        if let Some(item) = registry.get(target)
            && item.active_participants().is_empty()
            && let Some(object) = item.object
        {
            ledger.release(object);
        }

        tracing::debug!(?target, ?participant, "engagement ended");
        events.push(InteractionEvent::EngageEnded {
            target,
            participant,
        });
        true
    }

    /// Disengages every target this participant holds, in engagement order.
    pub fn stop_all(
        &mut self,
        participant: ParticipantId,
        registry: &mut InteractionRegistry,
        ledger: &mut OwnershipLedger,
        events: &mut Vec<InteractionEvent>,
    ) {
        let Some(session) = self.sessions.get(participant) else {
            return;
        };
        for target in session.active_targets.clone() {
            self.force_disengage(target, participant, registry, ledger, events);
        }
    }

    /// Applies a hover change from the proximity collaborator. Emits
    /// `HoverChanged` only on an actual state transition.
    pub fn set_hovering(
        &self,
        target: InteractableId,
        participant: ParticipantId,
        hovering: bool,
        registry: &mut InteractionRegistry,
        events: &mut Vec<InteractionEvent>,
    ) {
        if !self.sessions.contains(participant) {
            return;
        }
        let changed = if hovering {
            registry.add_hovering(target, participant)
        } else {
            registry.remove_hovering(target, participant)
        };
        if changed {
            events.push(InteractionEvent::HoverChanged {
                target,
                participant,
                hovering,
            });
        }
    }

    /// Advances the deferred-disengage queue and applies every due task.
    /// A task whose pair already disengaged by other means is a no-op.
    pub fn run_deferred(
        &mut self,
        dt: f32,
        tasks: &mut TaskQueue,
        registry: &mut InteractionRegistry,
        ledger: &mut OwnershipLedger,
        events: &mut Vec<InteractionEvent>,
    ) {
        for (target, participant) in tasks.advance(dt) {
            self.force_disengage(target, participant, registry, ledger, events);
        }
    }

    /// Ends a session: the mandatory cleanup path. Every active target is
    /// force-disengaged (releasing ownership transfers), hover entries are
    /// cleared, and the handle is invalidated.
    pub fn destroy(
        &mut self,
        participant: ParticipantId,
        registry: &mut InteractionRegistry,
        ledger: &mut OwnershipLedger,
        events: &mut Vec<InteractionEvent>,
    ) {
        if !self.sessions.contains(participant) {
            return;
        }
        self.stop_all(participant, registry, ledger, events);

        let hovered: Vec<InteractableId> = registry
            .iter()
            .filter(|(_, item)| item.hovering_participants().contains(&participant))
            .map(|(id, _)| id)
            .collect();
        for target in hovered {
            registry.remove_hovering(target, participant);
            events.push(InteractionEvent::HoverChanged {
                target,
                participant,
                hovering: false,
            });
        }

        self.sessions.remove(participant);
        tracing::info!(?participant, "session ended");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tether_sync::{ObjectId, OwnerId};

    use crate::interactable::Interactable;

    use super::*;

    const HOST: OwnerId = OwnerId(0);

    struct Fixture {
        manager: SessionManager,
        registry: InteractionRegistry,
        ledger: OwnershipLedger,
        tasks: TaskQueue,
        config: ArbiterConfig,
        events: Vec<InteractionEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                manager: SessionManager::new(),
                registry: InteractionRegistry::new(),
                ledger: OwnershipLedger::new(HOST),
                tasks: TaskQueue::new(),
                config: ArbiterConfig::default(),
                events: Vec::new(),
            }
        }

        fn engage(
            &mut self,
            participant: ParticipantId,
            candidates: &[InteractableId],
            priority: u8,
        ) -> Option<InteractableId> {
            self.manager.request_engage(
                participant,
                &mut self.registry,
                &mut self.ledger,
                &mut self.tasks,
                candidates,
                priority,
                SelectMode::Equal,
                &self.config,
                &mut self.events,
            )
        }

        fn disengage(
            &mut self,
            participant: ParticipantId,
            candidates: &[InteractableId],
            priority: u8,
        ) -> Option<InteractableId> {
            self.manager.request_disengage(
                participant,
                &mut self.registry,
                &mut self.ledger,
                candidates,
                priority,
                SelectMode::Equal,
                &self.config,
                &mut self.events,
            )
        }
    }

    #[test]
    fn test_grab_handoff_scenario() {
        let mut fx = Fixture::new();
        let object = ObjectId(1);
        let target = fx.registry.insert(
            Interactable::new(1, EngagePolicy::Exclusive, InteractableKind::Grab)
                .with_object(object),
        );
        let a = fx.manager.create(true, false);
        let b = fx.manager.create(false, false);

        // A engages: sole holder, ownership transfers to A.
        assert_eq!(fx.engage(a, &[target], 1), Some(target));
        assert_eq!(fx.registry.active_participants(target), &[a]);
        assert_eq!(fx.ledger.owner_of(object), a.owner_id());

        // B requests at the same priority: no preemption policy, no match.
        assert_eq!(fx.engage(b, &[target], 1), None);
        assert_eq!(fx.registry.active_participants(target), &[a]);
        assert_eq!(fx.manager.get(b).unwrap().arbitration_misses(), 1);

        // A disengages: set empties, ownership reverts to neutral.
        assert_eq!(fx.disengage(a, &[target], 1), Some(target));
        assert_eq!(fx.registry.active_count(target), 0);
        assert_eq!(fx.ledger.owner_of(object), HOST);

        // B now succeeds.
        assert_eq!(fx.engage(b, &[target], 1), Some(target));
        assert_eq!(fx.registry.active_participants(target), &[b]);
    }

    #[test]
    fn test_exclusive_invariant_holds_through_any_sequence() {
        let mut fx = Fixture::new();
        let target = fx
            .registry
            .insert(Interactable::new(0, EngagePolicy::Exclusive, InteractableKind::Hold));
        let sessions: Vec<ParticipantId> =
            (0..4).map(|_| fx.manager.create(false, false)).collect();

        for round in 0..3 {
            for &p in &sessions {
                fx.engage(p, &[target], 0);
                assert!(fx.registry.active_count(target) <= 1, "round {round}");
            }
            let holder = fx.registry.active_participants(target).first().copied();
            if let Some(holder) = holder {
                fx.disengage(holder, &[target], 0);
            }
            assert!(fx.registry.active_count(target) <= 1);
        }
    }

    #[test]
    fn test_preemption_evicts_holder_with_end_event() {
        let mut fx = Fixture::new();
        let object = ObjectId(7);
        let target = fx.registry.insert(
            Interactable::new(1, EngagePolicy::Preemptive, InteractableKind::Grab)
                .with_object(object),
        );
        let a = fx.manager.create(false, false);
        let b = fx.manager.create(false, false);

        fx.engage(a, &[target], 1);
        fx.events.clear();

        // B takes over: A is forced out first, then B engages.
        assert_eq!(fx.engage(b, &[target], 1), Some(target));
        assert_eq!(fx.registry.active_participants(target), &[b]);
        assert_eq!(
            fx.events,
            vec![
                InteractionEvent::EngageEnded {
                    target,
                    participant: a
                },
                InteractionEvent::EngageStarted {
                    target,
                    participant: b
                },
            ]
        );
        assert_eq!(fx.ledger.owner_of(object), b.owner_id());
        assert!(fx.manager.get(a).unwrap().active_targets().is_empty());
    }

    #[test]
    fn test_disengage_is_idempotent() {
        let mut fx = Fixture::new();
        let target = fx
            .registry
            .insert(Interactable::new(1, EngagePolicy::Exclusive, InteractableKind::Hold));
        let a = fx.manager.create(false, false);

        fx.engage(a, &[target], 1);
        assert_eq!(fx.disengage(a, &[target], 1), Some(target));
        let state_after_first = fx.registry.active_count(target);
        let misses_after_first = fx.manager.get(a).unwrap().arbitration_misses();

        // Second disengage resolves nothing and changes nothing.
        assert_eq!(fx.disengage(a, &[target], 1), None);
        assert_eq!(fx.registry.active_count(target), state_after_first);
        assert_eq!(
            fx.manager.get(a).unwrap().arbitration_misses(),
            misses_after_first + 1
        );
    }

    #[test]
    fn test_shared_policy_admits_multiple_holders() {
        let mut fx = Fixture::new();
        let target = fx
            .registry
            .insert(Interactable::new(1, EngagePolicy::Shared, InteractableKind::Hold));
        let a = fx.manager.create(false, false);
        let b = fx.manager.create(false, false);

        assert_eq!(fx.engage(a, &[target], 1), Some(target));
        assert_eq!(fx.engage(b, &[target], 1), Some(target));
        assert_eq!(fx.registry.active_count(target), 2);

        fx.disengage(a, &[target], 1);
        assert_eq!(fx.registry.active_participants(target), &[b]);
    }

    #[test]
    fn test_trigger_auto_resets_via_deferred_task() {
        let mut fx = Fixture::new();
        let target = fx.registry.insert(Interactable::new(
            0,
            EngagePolicy::Exclusive,
            InteractableKind::Trigger { reset_after: 0.3 },
        ));
        let a = fx.manager.create(true, false);

        fx.engage(a, &[target], 0);
        assert!(fx.registry.is_active(target, a));

        // Not yet due.
        fx.manager.run_deferred(
            0.1,
            &mut fx.tasks,
            &mut fx.registry,
            &mut fx.ledger,
            &mut fx.events,
        );
        assert!(fx.registry.is_active(target, a));

        // Past the reset window: auto-disengaged.
        fx.manager.run_deferred(
            0.3,
            &mut fx.tasks,
            &mut fx.registry,
            &mut fx.ledger,
            &mut fx.events,
        );
        assert!(!fx.registry.is_active(target, a));
        assert!(
            fx.events
                .contains(&InteractionEvent::EngageEnded {
                    target,
                    participant: a
                })
        );
    }

    #[test]
    fn test_toggle_flips_on_each_engage() {
        let mut fx = Fixture::new();
        let target = fx.registry.insert(Interactable::new(
            0,
            EngagePolicy::Shared,
            InteractableKind::Toggle { on: false },
        ));
        let a = fx.manager.create(true, false);

        fx.engage(a, &[target], 0);
        assert_eq!(
            fx.registry.get(target).unwrap().kind,
            InteractableKind::Toggle { on: true }
        );
        fx.disengage(a, &[target], 0);
        fx.engage(a, &[target], 0);
        assert_eq!(
            fx.registry.get(target).unwrap().kind,
            InteractableKind::Toggle { on: false }
        );
    }

    #[test]
    fn test_stop_all_releases_in_engagement_order() {
        let mut fx = Fixture::new();
        let first = fx
            .registry
            .insert(Interactable::new(0, EngagePolicy::Shared, InteractableKind::Hold));
        let second = fx
            .registry
            .insert(Interactable::new(1, EngagePolicy::Shared, InteractableKind::Hold));
        let a = fx.manager.create(false, false);

        fx.engage(a, &[first, second], 0);
        fx.engage(a, &[first, second], 1);
        fx.events.clear();

        fx.manager
            .stop_all(a, &mut fx.registry, &mut fx.ledger, &mut fx.events);
        assert_eq!(
            fx.events,
            vec![
                InteractionEvent::EngageEnded {
                    target: first,
                    participant: a
                },
                InteractionEvent::EngageEnded {
                    target: second,
                    participant: a
                },
            ]
        );
        assert!(fx.manager.get(a).unwrap().active_targets().is_empty());
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut fx = Fixture::new();
        let object = ObjectId(2);
        let target = fx.registry.insert(
            Interactable::new(0, EngagePolicy::Exclusive, InteractableKind::Grab)
                .with_object(object),
        );
        let a = fx.manager.create(false, false);

        fx.engage(a, &[target], 0);
        fx.manager
            .set_hovering(target, a, true, &mut fx.registry, &mut fx.events);

        fx.manager
            .destroy(a, &mut fx.registry, &mut fx.ledger, &mut fx.events);

        assert!(!fx.manager.is_valid(a));
        assert_eq!(fx.registry.active_count(target), 0);
        assert!(!fx.registry.is_hovered(target, a));
        assert_eq!(fx.ledger.owner_of(object), HOST);

        // Stale-handle requests are silent no-ops.
        assert_eq!(fx.engage(a, &[target], 0), None);
    }

    #[test]
    fn test_hover_change_emits_only_on_transition() {
        let mut fx = Fixture::new();
        let target = fx
            .registry
            .insert(Interactable::new(0, EngagePolicy::Shared, InteractableKind::Hold));
        let a = fx.manager.create(false, false);

        fx.manager
            .set_hovering(target, a, true, &mut fx.registry, &mut fx.events);
        fx.manager
            .set_hovering(target, a, true, &mut fx.registry, &mut fx.events);
        assert_eq!(fx.events.len(), 1);

        fx.manager
            .set_hovering(target, a, false, &mut fx.registry, &mut fx.events);
        assert_eq!(fx.events.len(), 2);
    }

    #[test]
    fn test_laser_mode_session_respects_contact_only() {
        let mut fx = Fixture::new();
        let contact = fx.registry.insert(
            Interactable::new(0, EngagePolicy::Shared, InteractableKind::Hold).contact_only(),
        );
        let laser = fx.manager.create(true, true);

        assert_eq!(fx.engage(laser, &[contact], 0), None);
        assert_eq!(fx.manager.get(laser).unwrap().arbitration_misses(), 1);
    }
}
