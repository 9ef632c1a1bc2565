//! Stakehouse core - infrastructure for the giveaway resolution engine
//!
//! This library provides the pieces the engine treats as external
//! collaborators: opaque platform references, the trusted Random Source
//! abstraction with its concrete clients, and the SQLite-backed storage
//! layer the state store sits on.

pub mod error;
pub mod random;
pub mod storage;
pub mod types;

pub use error::{Result, StakehouseError};
pub use random::{LocalSource, RandomOrgSource, RandomSource, ScriptedSource};
pub use storage::{DrawingRow, DrawingStore, Storage};
pub use types::{ChannelRef, MessageRef, UserRef};
