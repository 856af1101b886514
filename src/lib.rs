//! Stowage: Durable Settings Persistence
//!
//! Persists a process's configuration to a file and restores it on startup.
//! The opaque state dictionary produced by an owning subsystem is merged
//! with locally tracked integer and string overrides, encoded into a
//! canonical binary tree format, and written with an atomic replace. Loads
//! fall back to a sibling backup file when the primary is missing or
//! corrupt.

pub mod codec;
pub mod error;
pub mod store;

pub use codec::{decode, encode, Dict, Value};
pub use error::{DecodeError, StoreError};
pub use store::{SettingsStore, StateProvider};
