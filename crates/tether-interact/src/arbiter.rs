//! Stateless interaction arbitration: given a requesting participant and a
//! pool of candidate interactables, pick at most one target to engage or
//! disengage.
//!
//! Resolution is a bounded linear-recursion priority search, not a sort: an
//! exact priority match wins outright, otherwise the search steps the target
//! priority toward more urgent (lower) or less urgent (higher) values until
//! it leaves `[0, max_depth)`. It deliberately favors the first
//! exact-or-nearest match over a globally "best" one. Every failure mode —
//! empty pool, policy refusal, depth exhaustion — resolves to `None`, an
//! expected outcome rather than an error.

use crate::interactable::{EngagePolicy, InteractableId, ParticipantId};
use crate::registry::InteractionRegistry;

/// Direction of the secondary priority search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Exact priority match only; no secondary pass.
    Equal,
    /// Search upward in urgency (decrementing priority) on a miss.
    HigherEqual,
    /// Search downward in urgency (incrementing priority) on a miss.
    LowerEqual,
}

/// Resolves the single interactable `participant` may engage, or `None`.
///
/// Candidates are filtered before the priority search: administratively
/// disabled targets, laser-ineligible targets when the requester is in laser
/// mode, targets this participant already holds (no re-entrant engagement),
/// and exclusively-held targets (unless the policy is preemptive) are all
/// dropped from the pool.
pub fn resolve_engage(
    registry: &InteractionRegistry,
    candidates: &[InteractableId],
    participant: ParticipantId,
    laser_mode: bool,
    priority: u8,
    mode: SelectMode,
    max_depth: u8,
) -> Option<InteractableId> {
    let pool: Vec<InteractableId> = candidates
        .iter()
        .copied()
        .filter(|&id| engage_eligible(registry, id, participant, laser_mode))
        .collect();
    search(registry, &pool, priority, mode, max_depth)
}

/// Resolves the single interactable `participant` may disengage, or `None`.
///
/// The pool keeps only targets this participant actually holds; priority
/// search rules are shared with engagement. Disabled targets stay eligible —
/// releasing a hold must always be possible.
pub fn resolve_disengage(
    registry: &InteractionRegistry,
    candidates: &[InteractableId],
    participant: ParticipantId,
    priority: u8,
    mode: SelectMode,
    max_depth: u8,
) -> Option<InteractableId> {
    let pool: Vec<InteractableId> = candidates
        .iter()
        .copied()
        .filter(|&id| registry.is_active(id, participant))
        .collect();
    search(registry, &pool, priority, mode, max_depth)
}

fn engage_eligible(
    registry: &InteractionRegistry,
    id: InteractableId,
    participant: ParticipantId,
    laser_mode: bool,
) -> bool {
    let Some(item) = registry.get(id) else {
        return false;
    };
    if !item.enabled {
        return false;
    }
    if laser_mode && !item.laser_eligible {
        return false;
    }
    if item.active_participants().contains(&participant) {
        return false;
    }
    if !item.active_participants().is_empty() && item.policy == EngagePolicy::Exclusive {
        return false;
    }
    true
}

/// Bounded recursive priority search over an already-filtered pool.
fn search(
    registry: &InteractionRegistry,
    pool: &[InteractableId],
    priority: u8,
    mode: SelectMode,
    max_depth: u8,
) -> Option<InteractableId> {
    if pool.is_empty() {
        return None;
    }
    if let Some(&id) = pool
        .iter()
        .find(|&&id| registry.get(id).is_some_and(|item| item.priority == priority))
    {
        return Some(id);
    }
    match mode {
        SelectMode::Equal => None,
        SelectMode::HigherEqual => {
            // Toward more urgent; stops below zero.
            let next = priority.checked_sub(1)?;
            search(registry, pool, next, mode, max_depth)
        }
        SelectMode::LowerEqual => {
            let next = priority.checked_add(1)?;
            if next >= max_depth {
                return None;
            }
            search(registry, pool, next, mode, max_depth)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::ArenaHandle;
    use crate::interactable::{Interactable, InteractableKind};

    use super::*;

    const DEPTH: u8 = 5;

    fn participant(n: u32) -> ParticipantId {
        ParticipantId::from_raw(n, 0)
    }

    fn item(priority: u8, policy: EngagePolicy) -> Interactable {
        Interactable::new(priority, policy, InteractableKind::Grab)
    }

    #[test]
    fn test_empty_pool_resolves_to_none() {
        let registry = InteractionRegistry::new();
        for mode in [SelectMode::Equal, SelectMode::HigherEqual, SelectMode::LowerEqual] {
            assert_eq!(
                resolve_engage(&registry, &[], participant(1), false, 2, mode, u8::MAX),
                None
            );
        }
    }

    #[test]
    fn test_exact_priority_match_wins() {
        let mut registry = InteractionRegistry::new();
        let p1 = registry.insert(item(1, EngagePolicy::Shared));
        let p2 = registry.insert(item(2, EngagePolicy::Shared));
        let p3 = registry.insert(item(3, EngagePolicy::Shared));
        let pool = [p1, p2, p3];

        let resolved = resolve_engage(
            &registry,
            &pool,
            participant(1),
            false,
            2,
            SelectMode::Equal,
            DEPTH,
        );
        assert_eq!(resolved, Some(p2));
    }

    #[test]
    fn test_equal_mode_gives_up_without_exact_match() {
        let mut registry = InteractionRegistry::new();
        let p1 = registry.insert(item(1, EngagePolicy::Shared));
        let resolved = resolve_engage(
            &registry,
            &[p1],
            participant(1),
            false,
            3,
            SelectMode::Equal,
            DEPTH,
        );
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_higher_equal_searches_upward() {
        let mut registry = InteractionRegistry::new();
        let p0 = registry.insert(item(0, EngagePolicy::Shared));
        // Requested priority 3; nearest on the way down to 0 is priority 0.
        let resolved = resolve_engage(
            &registry,
            &[p0],
            participant(1),
            false,
            3,
            SelectMode::HigherEqual,
            DEPTH,
        );
        assert_eq!(resolved, Some(p0));
    }

    #[test]
    fn test_lower_equal_stops_at_max_depth() {
        let mut registry = InteractionRegistry::new();
        let p4 = registry.insert(item(4, EngagePolicy::Shared));
        let found = resolve_engage(
            &registry,
            &[p4],
            participant(1),
            false,
            1,
            SelectMode::LowerEqual,
            DEPTH,
        );
        assert_eq!(found, Some(p4));

        // With max_depth 4 the search may not reach priority 4.
        let missed = resolve_engage(
            &registry,
            &[p4],
            participant(1),
            false,
            1,
            SelectMode::LowerEqual,
            4,
        );
        assert_eq!(missed, None);
    }

    #[test]
    fn test_disabled_and_laser_ineligible_filtered() {
        let mut registry = InteractionRegistry::new();
        let mut disabled = item(1, EngagePolicy::Shared);
        disabled.enabled = false;
        let d = registry.insert(disabled);
        let contact = registry.insert(item(1, EngagePolicy::Shared).contact_only());

        // Disabled target never resolves.
        assert_eq!(
            resolve_engage(&registry, &[d], participant(1), false, 1, SelectMode::Equal, DEPTH),
            None
        );
        // Contact-only target refuses a laser-mode requester...
        assert_eq!(
            resolve_engage(&registry, &[contact], participant(1), true, 1, SelectMode::Equal, DEPTH),
            None
        );
        // ...but accepts a contact requester.
        assert_eq!(
            resolve_engage(&registry, &[contact], participant(1), false, 1, SelectMode::Equal, DEPTH),
            Some(contact)
        );
    }

    #[test]
    fn test_exclusive_holder_blocks_without_preemption() {
        let mut registry = InteractionRegistry::new();
        let id = registry.insert(item(1, EngagePolicy::Exclusive));
        registry.add_active(id, participant(1));

        assert_eq!(
            resolve_engage(&registry, &[id], participant(2), false, 1, SelectMode::Equal, DEPTH),
            None
        );
    }

    #[test]
    fn test_preemptive_target_resolves_despite_holder() {
        let mut registry = InteractionRegistry::new();
        let id = registry.insert(item(1, EngagePolicy::Preemptive));
        registry.add_active(id, participant(1));

        assert_eq!(
            resolve_engage(&registry, &[id], participant(2), false, 1, SelectMode::Equal, DEPTH),
            Some(id)
        );
    }

    #[test]
    fn test_no_reentrant_engagement() {
        let mut registry = InteractionRegistry::new();
        let id = registry.insert(item(1, EngagePolicy::Shared));
        registry.add_active(id, participant(1));

        assert_eq!(
            resolve_engage(&registry, &[id], participant(1), false, 1, SelectMode::Equal, DEPTH),
            None
        );
    }

    #[test]
    fn test_disengage_resolves_only_held_targets() {
        let mut registry = InteractionRegistry::new();
        let held = registry.insert(item(1, EngagePolicy::Shared));
        let other = registry.insert(item(1, EngagePolicy::Shared));
        registry.add_active(held, participant(1));

        let resolved = resolve_disengage(
            &registry,
            &[other, held],
            participant(1),
            1,
            SelectMode::Equal,
            DEPTH,
        );
        assert_eq!(resolved, Some(held));
    }
}
