//! Network-authority ownership: which peer's commands are authoritative for
//! which object.
//!
//! Successful engagement transfers an object's authority to the engaging
//! peer so its direct transform writes are accepted; releasing the last hold
//! restores the neutral default owner. Both operations are idempotent —
//! re-asserting the current owner is a no-op, which keeps racing signals
//! (overlap-end and explicit-stop in the same tick) from churning authority.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a replicated world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Unique identifier for an authority-holding peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

/// Tracks the authoritative owner of every object that has diverged from the
/// neutral default (usually the server/host).
#[derive(Debug, Clone)]
pub struct OwnershipLedger {
    default_owner: OwnerId,
    owners: HashMap<ObjectId, OwnerId>,
}

impl OwnershipLedger {
    /// Creates a ledger whose neutral owner is `default_owner`.
    pub fn new(default_owner: OwnerId) -> Self {
        Self {
            default_owner,
            owners: HashMap::new(),
        }
    }

    /// The neutral owner objects revert to on release.
    pub fn default_owner(&self) -> OwnerId {
        self.default_owner
    }

    /// Current authoritative owner of `object`.
    pub fn owner_of(&self, object: ObjectId) -> OwnerId {
        self.owners.get(&object).copied().unwrap_or(self.default_owner)
    }

    /// Returns whether `owner` currently holds authority over `object`.
    pub fn is_owned_by(&self, object: ObjectId, owner: OwnerId) -> bool {
        self.owner_of(object) == owner
    }

    /// Transfers authority over `object` to `owner`. Returns `false` if the
    /// owner was already `owner` (no-op).
    pub fn grant(&mut self, object: ObjectId, owner: OwnerId) -> bool {
        if self.owner_of(object) == owner {
            return false;
        }
        tracing::debug!(?object, ?owner, "authority transferred");
        if owner == self.default_owner {
            self.owners.remove(&object);
        } else {
            self.owners.insert(object, owner);
        }
        true
    }

    /// Restores `object` to the neutral owner. Returns `false` if it was
    /// already neutral (no-op).
    pub fn release(&mut self, object: ObjectId) -> bool {
        if self.owners.remove(&object).is_some() {
            tracing::debug!(?object, "authority released to default owner");
            true
        } else {
            false
        }
    }

    /// Number of objects whose authority currently diverges from the default.
    pub fn transferred_count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: OwnerId = OwnerId(0);
    const PEER_A: OwnerId = OwnerId(10);
    const PEER_B: OwnerId = OwnerId(11);
    const OBJ: ObjectId = ObjectId(1);

    #[test]
    fn test_unknown_object_has_default_owner() {
        let ledger = OwnershipLedger::new(HOST);
        assert_eq!(ledger.owner_of(OBJ), HOST);
        assert!(ledger.is_owned_by(OBJ, HOST));
    }

    #[test]
    fn test_grant_and_release() {
        let mut ledger = OwnershipLedger::new(HOST);
        assert!(ledger.grant(OBJ, PEER_A));
        assert_eq!(ledger.owner_of(OBJ), PEER_A);
        assert_eq!(ledger.transferred_count(), 1);

        assert!(ledger.release(OBJ));
        assert_eq!(ledger.owner_of(OBJ), HOST);
        assert_eq!(ledger.transferred_count(), 0);
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut ledger = OwnershipLedger::new(HOST);
        assert!(ledger.grant(OBJ, PEER_A));
        assert!(!ledger.grant(OBJ, PEER_A), "re-assert must be a no-op");
        assert_eq!(ledger.owner_of(OBJ), PEER_A);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut ledger = OwnershipLedger::new(HOST);
        ledger.grant(OBJ, PEER_A);
        assert!(ledger.release(OBJ));
        assert!(!ledger.release(OBJ), "second release must be a no-op");
    }

    #[test]
    fn test_handoff_between_peers() {
        let mut ledger = OwnershipLedger::new(HOST);
        ledger.grant(OBJ, PEER_A);
        assert!(ledger.grant(OBJ, PEER_B));
        assert_eq!(ledger.owner_of(OBJ), PEER_B);
        assert_eq!(ledger.transferred_count(), 1);
    }

    #[test]
    fn test_granting_default_owner_clears_entry() {
        let mut ledger = OwnershipLedger::new(HOST);
        ledger.grant(OBJ, PEER_A);
        assert!(ledger.grant(OBJ, HOST));
        assert_eq!(ledger.transferred_count(), 0);
        assert!(!ledger.release(OBJ));
    }
}
