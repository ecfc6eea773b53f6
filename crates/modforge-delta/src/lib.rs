//! The JSON-path delta algebra: a tagged-union cursor over
//! `serde_json::Value` plus the `add`/`update`/`remove` operation
//! semantics defined for [`modforge_core::spec::ModSpec`].
//!
//! This crate has no knowledge of workspaces, persistence, or the version
//! log — that's `modforge-store`. It only knows how to apply one delta to
//! one JSON tree.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod apply;
mod batch;
mod path;

pub use apply::apply_delta;
pub use batch::expand_batch;
pub use path::{tokenize, JsonCursor, PathToken};
