//! Domain types shared by every stage of the Mod Forge run engine: the
//! user-facing spec, the delta/version log, the compiled IR, the task DAG,
//! the run/event model, and the error catalog every other crate returns.
//!
//! Nothing in this crate performs I/O. `modforge-store`, `modforge-compiler`,
//! `modforge-planner`, `modforge-executor`, `modforge-bus`, and
//! `modforge-runtime` each own one stage of the pipeline and depend on these
//! types rather than redefining them.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod delta;
pub mod error;
pub mod hash;
pub mod ir;
pub mod run;
pub mod spec;
pub mod task;

pub use config::{CompatibilityConfig, ForgeConfig, Loader, Mapping};
pub use delta::{BatchDelta, DeltaOperation, SpecDelta, SpecSequence, SpecVersion};
pub use error::{ErrorCode, ForgeError};
pub use ir::{AssetKind, IRAsset, IRBlock, IRItem, IRRecipe, IRTool, ModIR};
pub use run::{Run, RunEvent, RunEventType, RunResult, RunState, RunType};
pub use spec::{BlockSpec, CreativeTab, ItemSpec, MaterialTier, ModSpec, Rarity, SoundGroup, ToolKind, ToolSpec};
pub use task::{Task, TaskDAG, TaskStatus};
