//! Transform snapshot value types.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A world object's replicated pose. The physically simulated object itself
/// is opaque to this crate; only its pose and a scalar speed cross the
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    /// World-space location.
    pub location: Vec3,
    /// World-space rotation.
    pub rotation: Quat,
}

impl ObjectTransform {
    /// Identity pose at the origin.
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a transform from a location and rotation.
    pub fn new(location: Vec3, rotation: Quat) -> Self {
        Self { location, rotation }
    }

    /// Moves this transform toward `target` by interpolation factor `alpha`
    /// in `[0, 1]` (linear for location, spherical for rotation).
    pub fn approach(&mut self, target: &ObjectTransform, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.location = self.location.lerp(target.location, alpha);
        self.rotation = self.rotation.slerp(target.rotation, alpha);
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A sequence-numbered sample of an object's pose and interaction flag.
///
/// `sequence` strictly increases (mod 2^32) with every authoritative emission
/// for the same object; staleness must be decided with
/// [`crate::sequence::is_newer`], never raw `<`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSnapshot {
    /// Wraparound-safe monotonic counter.
    pub sequence: u32,
    /// Sampled world-space location.
    pub location: Vec3,
    /// Sampled world-space rotation.
    pub rotation: Quat,
    /// Whether the object was actively interacted with when sampled.
    pub interacted: bool,
}

impl PhysicsSnapshot {
    /// Samples a snapshot from a live transform.
    pub fn capture(sequence: u32, transform: &ObjectTransform, interacted: bool) -> Self {
        Self {
            sequence,
            location: transform.location,
            rotation: transform.rotation,
            interacted,
        }
    }

    /// The pose carried by this snapshot.
    pub fn transform(&self) -> ObjectTransform {
        ObjectTransform {
            location: self.location,
            rotation: self.rotation,
        }
    }
}
