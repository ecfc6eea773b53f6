//! The Run controller: wires the Spec Store, Compiler, Planner,
//! and Executor into the generate/build run state machine, gated on
//! human approval for proposed deltas, publishing every transition
//! through the injected event bus.
//!
//! This is the one crate in the workspace that depends on every pipeline
//! stage; `modforge-daemon` and `modforge-cli` depend on this crate
//! rather than wiring the pipeline themselves.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod orchestrator;
mod progress;

pub use controller::RunController;
pub use orchestrator::{MockOrchestrator, Orchestrator, OrchestratorResponse};
