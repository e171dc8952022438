//! Configuration for the tether interaction/replication stack.
//!
//! Settings persist to disk as RON files and are constructed once at session
//! start, then passed by reference into the synchronization and arbitration
//! components. There is no hidden global settings object.

mod config;
mod error;

pub use config::{ArbiterConfig, Config, DebugConfig, SyncConfig};
pub use error::ConfigError;
