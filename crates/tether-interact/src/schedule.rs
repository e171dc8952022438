//! Deferred single-shot disengagement.
//!
//! Momentary controls (triggers) schedule an automatic disengage a fixed
//! duration after engagement. Tasks are keyed by (target, generation
//! counter): scheduling again for the same target bumps the generation, so
//! a superseded task is invalidated by generation mismatch rather than
//! relying on any timer handle cancellation.

use std::collections::HashMap;

use crate::interactable::{InteractableId, ParticipantId};

#[derive(Debug, Clone)]
struct ScheduledDisengage {
    target: InteractableId,
    participant: ParticipantId,
    generation: u64,
    fire_at: f64,
}

/// Queue of pending deferred disengages, advanced once per simulation step.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    now: f64,
    tasks: Vec<ScheduledDisengage>,
    generations: HashMap<InteractableId, u64>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a disengage of `(target, participant)` after `delay`
    /// seconds. Replaces any pending task for the same target: the previous
    /// task's generation no longer matches and will never fire.
    pub fn schedule(&mut self, target: InteractableId, participant: ParticipantId, delay: f32) {
        let generation = self.generations.entry(target).or_insert(0);
        *generation += 1;
        self.tasks.push(ScheduledDisengage {
            target,
            participant,
            generation: *generation,
            fire_at: self.now + f64::from(delay.max(0.0)),
        });
    }

    /// Advances time by `dt` and returns the due, still-valid
    /// `(target, participant)` pairs. Superseded tasks are dropped silently.
    pub fn advance(&mut self, dt: f32) -> Vec<(InteractableId, ParticipantId)> {
        self.now += f64::from(dt);
        let now = self.now;
        let mut due = Vec::new();
        self.tasks.retain(|task| {
            if task.fire_at > now {
                return true;
            }
            if self.generations.get(&task.target) == Some(&task.generation) {
                due.push((task.target, task.participant));
            }
            false
        });
        due
    }

    /// Number of pending (possibly superseded) tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}
