//! Authoritative transform synchronization: sequence-numbered snapshot
//! replication with adaptive cadence, observer-side interpolation, and
//! network-authority ownership transfer.
//!
//! One timeline is authoritative per object; everyone else observes. Snapshot
//! delivery is unreliable and unordered — the wraparound-safe sequence
//! comparison in [`sequence`] is the sole mechanism restoring newer-wins
//! ordering on the observer side. Dropped snapshots are never retransmitted;
//! the next accepted snapshot supersedes them.

pub mod authority;
pub mod channel;
pub mod sequence;
pub mod snapshot;
pub mod wire;

pub use authority::{ObjectId, OwnerId, OwnershipLedger};
pub use channel::{SnapshotAuthority, SnapshotObserver};
pub use sequence::{is_newer, is_older, wrapping_diff};
pub use snapshot::{ObjectTransform, PhysicsSnapshot};
pub use wire::{SyncMessage, WireError, decode_message, encode_message};
