//! The Spec Store: owns exactly one current [`ModSpec`] per workspace and
//! an immutable, append-only version history, persisted to disk.
//!
//! The path algebra itself lives in `modforge-delta`; this crate wraps it
//! with persistence, per-workspace write serialization, and the version
//! log.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod store;

pub use modforge_core::spec::ModSpec;
pub use store::SpecStore;
