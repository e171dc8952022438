//! Wire encoding for synchronization messages.
//!
//! Snapshots travel over the unreliable channel; engagement lifecycle
//! notifications travel over the reliable, ordered channel (ownership
//! correctness depends on observers seeing start-before-end per peer/object
//! pair). Both share one postcard-encoded envelope.

use serde::{Deserialize, Serialize};

use crate::authority::{ObjectId, OwnerId};
use crate::snapshot::PhysicsSnapshot;

/// Everything the authority sends to observers about one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// An authoritative transform sample (unreliable delivery).
    Snapshot {
        /// Object the snapshot belongs to.
        object: ObjectId,
        /// The sampled state.
        snapshot: PhysicsSnapshot,
    },
    /// A peer began interacting with an object (reliable delivery).
    EngageStarted {
        /// Object being engaged.
        object: ObjectId,
        /// Peer now holding authority.
        peer: OwnerId,
    },
    /// A peer stopped interacting with an object (reliable delivery).
    EngageEnded {
        /// Object being released.
        object: ObjectId,
        /// Peer that held it.
        peer: OwnerId,
    },
}

/// Errors from encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Failed to serialize a message.
    #[error("failed to encode sync message: {0}")]
    Encode(#[source] postcard::Error),
    /// Failed to deserialize a message (truncated or corrupt payload).
    #[error("failed to decode sync message: {0}")]
    Decode(#[source] postcard::Error),
}

/// Encodes a message to its postcard byte representation.
pub fn encode_message(message: &SyncMessage) -> Result<Vec<u8>, WireError> {
    postcard::to_allocvec(message).map_err(WireError::Encode)
}

/// Decodes a message from postcard bytes.
pub fn decode_message(bytes: &[u8]) -> Result<SyncMessage, WireError> {
    postcard::from_bytes(bytes).map_err(WireError::Decode)
}
