//! The snapshot replication channel: authority-side adaptive-cadence
//! sampling and observer-side interpolation.
//!
//! The authority samples the owning object's pose once per simulation step
//! and emits a [`PhysicsSnapshot`] whenever the accumulated time crosses the
//! currently-applicable replication interval. Interacted (grabbed) objects
//! replicate at the fast bound, idle objects at the slow bound. Observers
//! accept only strictly newer snapshots and exponentially approach the latest
//! accepted pose, which tolerates jitter in arrival timing.

use tether_config::SyncConfig;

use crate::sequence::is_newer;
use crate::snapshot::{ObjectTransform, PhysicsSnapshot};

// ---------------------------------------------------------------------------
// SnapshotAuthority
// ---------------------------------------------------------------------------

/// Authority-side half of the replication channel for one object.
#[derive(Debug, Clone)]
pub struct SnapshotAuthority {
    config: SyncConfig,
    /// Last emitted snapshot; its sequence seeds the next emission.
    cached: PhysicsSnapshot,
    accumulated: f32,
    interacted: bool,
}

impl SnapshotAuthority {
    /// Creates the authority half, seeded with the object's initial pose so
    /// a stationary object does not emit until something actually changes.
    pub fn new(config: &SyncConfig, initial: &ObjectTransform) -> Self {
        Self {
            config: *config,
            cached: PhysicsSnapshot::capture(0, initial, false),
            accumulated: 0.0,
            interacted: false,
        }
    }

    /// Flags the object as actively interacted (raises replication cadence).
    pub fn set_interacted(&mut self, interacted: bool) {
        self.interacted = interacted;
    }

    /// Whether the object is currently flagged as interacted.
    pub fn interacted(&self) -> bool {
        self.interacted
    }

    /// Sequence number of the last emitted snapshot.
    pub fn sequence(&self) -> u32 {
        self.cached.sequence
    }

    /// One authoritative simulation step. Returns a snapshot to broadcast,
    /// or `None` when nothing is due this step.
    ///
    /// A stationary, non-interacted object skips periodic sampling entirely,
    /// but a divergence between the cached and live location (an external
    /// move such as a teleport) emits exactly one corrective snapshot so the
    /// object is never silently desynchronized.
    pub fn tick(&mut self, live: &ObjectTransform, speed: f32, dt: f32) -> Option<PhysicsSnapshot> {
        if speed < self.config.rest_epsilon && !self.interacted {
            if self.cached.location != live.location {
                return Some(self.emit(live));
            }
            return None;
        }

        self.accumulated += dt;
        if self.accumulated >= self.replication_interval(speed) {
            self.accumulated = 0.0;
            return Some(self.emit(live));
        }
        None
    }

    fn emit(&mut self, live: &ObjectTransform) -> PhysicsSnapshot {
        let snapshot =
            PhysicsSnapshot::capture(self.cached.sequence.wrapping_add(1), live, self.interacted);
        self.cached = snapshot;
        snapshot
    }

    /// The interval currently governing emission cadence. Interacted objects
    /// use the fast bound; otherwise the idle bound, optionally scaled
    /// toward the fast bound by the clamped speed ratio.
    fn replication_interval(&self, speed: f32) -> f32 {
        if self.interacted {
            return self.config.interacted_interval;
        }
        if self.config.velocity_scaled {
            let ratio = (speed / self.config.velocity_threshold).clamp(0.0, 1.0);
            return self.config.idle_interval
                + (self.config.interacted_interval - self.config.idle_interval) * ratio;
        }
        self.config.idle_interval
    }
}

// ---------------------------------------------------------------------------
// SnapshotObserver
// ---------------------------------------------------------------------------

/// Observer-side half of the replication channel for one object.
///
/// Holds the last accepted snapshot plus the locally-interpolated "active"
/// pose used for placement. Stale or duplicate snapshots arriving over the
/// unreliable channel are discarded and counted, never surfaced as errors.
#[derive(Debug, Clone)]
pub struct SnapshotObserver {
    config: SyncConfig,
    /// Debug mode: snap directly to the latest snapshot, no interpolation.
    snap_to_latest: bool,
    latest: Option<PhysicsSnapshot>,
    active: ObjectTransform,
    stale_discards: u64,
}

impl SnapshotObserver {
    /// Creates the observer half starting from the object's initial pose.
    pub fn new(config: &SyncConfig, initial: &ObjectTransform, snap_to_latest: bool) -> Self {
        Self {
            config: *config,
            snap_to_latest,
            latest: None,
            active: *initial,
            stale_discards: 0,
        }
    }

    /// Offers an incoming snapshot. Accepted (and returns `true`) only if it
    /// is strictly newer than the latest accepted one.
    pub fn receive(&mut self, snapshot: PhysicsSnapshot) -> bool {
        match self.latest {
            Some(latest) if !is_newer(snapshot.sequence, latest.sequence) => {
                self.stale_discards += 1;
                tracing::trace!(
                    incoming = snapshot.sequence,
                    latest = latest.sequence,
                    "discarding stale snapshot"
                );
                false
            }
            _ => {
                self.latest = Some(snapshot);
                true
            }
        }
    }

    /// One observer simulation step: move the active pose toward the latest
    /// accepted snapshot.
    ///
    /// The interpolation speed is the reciprocal of twice the applicable
    /// replication interval — the same idle/interacted selection the
    /// authority makes, so both sides converge on the same cadence
    /// assumption. The approach is exponential, not a lerp-to-completion.
    pub fn tick(&mut self, dt: f32) {
        let Some(latest) = self.latest else {
            return;
        };

        if self.snap_to_latest {
            self.active = latest.transform();
            return;
        }

        let interval = if latest.interacted {
            self.config.interacted_interval
        } else {
            self.config.idle_interval
        };
        let speed = 1.0 / (2.0 * interval);
        self.active.approach(&latest.transform(), speed * dt);
    }

    /// The locally-interpolated pose used for placement.
    pub fn active(&self) -> &ObjectTransform {
        &self.active
    }

    /// The last accepted snapshot, if any.
    pub fn latest(&self) -> Option<&PhysicsSnapshot> {
        self.latest.as_ref()
    }

    /// Number of stale/duplicate snapshots discarded so far. The primary
    /// signal of real-world reordering severity.
    pub fn stale_discards(&self) -> u64 {
        self.stale_discards
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
