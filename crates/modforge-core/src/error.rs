//! Comprehensive error catalog for the Mod Forge run engine.
//!
//! Every error code follows the pattern `MF-X###` where `X` is the category
//! letter and `###` is a three-digit number:
//!
//! - **D** — Delta / Spec Store errors (user input)
//! - **C** — Compiler errors
//! - **X** — Execution errors
//! - **R** — Run-control errors
//! - **S** — System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumeration of all Mod Forge error codes, organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // ── Delta / Spec Store (D) ──────────────────────────────────────
    /// The delta targets a path that does not exist in the current spec.
    PathNotFound,
    /// The delta's path resolves through a value of the wrong shape (e.g. indexing a scalar).
    PathTypeMismatch,
    /// No spec has been initialized for this workspace yet.
    NoCurrentSpec,
    /// The requested spec version does not exist.
    VersionNotFound,
    /// A spec already exists for this workspace; `initialize` cannot run twice.
    SpecAlreadyExists,
    /// An `add` targeted an index further than one past the end of the array.
    IndexOutOfBounds,
    /// An enum leaf value did not match any canonical or legacy alias.
    InvalidEnumValue,

    // ── Compiler (C) ─────────────────────────────────────────────────
    /// Two or more elements derived the same registry id.
    DuplicateRegistryId,
    /// A required field could not be derived (e.g. empty mod name after normalization).
    MissingRequiredField,
    /// A recipe references an element that does not exist in the IR.
    DanglingRecipeReference,

    // ── Execution (X) ────────────────────────────────────────────────
    /// No tool handler is registered for a task's `kind`.
    UnknownTaskKind,
    /// A declared-required parameter was absent from the resolved parameter map.
    MissingParameter,
    /// A tool handler returned an application-level failure.
    ToolFailure,
    /// A task exceeded its kind's configured timeout.
    Timeout,
    /// The READY set was empty while pending tasks remained.
    ExecutionDeadlock,

    // ── Run control (R) ──────────────────────────────────────────────
    /// A new run was triggered while another non-terminal run owns the workspace.
    RunInProgress,
    /// The requested run does not exist.
    RunNotFound,
    /// The requested state transition is not permitted from the run's current state.
    InvalidTransition,

    // ── System (S) ─────────────────────────────────────────────────
    /// An I/O operation failed.
    IoError,
    /// JSON serialization or deserialization failed.
    SerializationError,
    /// An unexpected internal error occurred.
    InternalError,
}

impl ErrorCode {
    /// Machine-readable code string (e.g. `"MF-D001"`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PathNotFound => "MF-D001",
            Self::PathTypeMismatch => "MF-D002",
            Self::NoCurrentSpec => "MF-D003",
            Self::VersionNotFound => "MF-D004",
            Self::SpecAlreadyExists => "MF-D005",
            Self::IndexOutOfBounds => "MF-D006",
            Self::InvalidEnumValue => "MF-D007",

            Self::DuplicateRegistryId => "MF-C001",
            Self::MissingRequiredField => "MF-C002",
            Self::DanglingRecipeReference => "MF-C003",

            Self::UnknownTaskKind => "MF-X001",
            Self::MissingParameter => "MF-X002",
            Self::ToolFailure => "MF-X003",
            Self::Timeout => "MF-X004",
            Self::ExecutionDeadlock => "MF-X005",

            Self::RunInProgress => "MF-R001",
            Self::RunNotFound => "MF-R002",
            Self::InvalidTransition => "MF-R003",

            Self::IoError => "MF-S001",
            Self::SerializationError => "MF-S002",
            Self::InternalError => "MF-S003",
        }
    }

    /// Human-readable category label.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::PathNotFound
            | Self::PathTypeMismatch
            | Self::NoCurrentSpec
            | Self::VersionNotFound
            | Self::SpecAlreadyExists
            | Self::IndexOutOfBounds
            | Self::InvalidEnumValue => "delta",

            Self::DuplicateRegistryId | Self::MissingRequiredField | Self::DanglingRecipeReference => {
                "compiler"
            }

            Self::UnknownTaskKind
            | Self::MissingParameter
            | Self::ToolFailure
            | Self::Timeout
            | Self::ExecutionDeadlock => "execution",

            Self::RunInProgress | Self::RunNotFound | Self::InvalidTransition => "run_control",

            Self::IoError | Self::SerializationError | Self::InternalError => "system",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The single error type returned by every crate in the run engine.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// A delta targeted a path that does not exist.
    #[error("{code}: path not found: {path}")]
    PathNotFound {
        /// The offending error code (always [`ErrorCode::PathNotFound`]).
        code: ErrorCode,
        /// The dotted/bracketed path that failed to resolve.
        path: String,
    },

    /// A delta's path resolved through a value of the wrong shape.
    #[error("{code}: path type mismatch at {path}: expected {expected}")]
    PathTypeMismatch {
        /// The offending error code.
        code: ErrorCode,
        /// The path at which the mismatch occurred.
        path: String,
        /// What shape was expected at that point.
        expected: String,
    },

    /// No current spec exists for the workspace.
    #[error("{code}: no current spec for workspace {workspace_id}")]
    NoCurrentSpec {
        /// The offending error code.
        code: ErrorCode,
        /// The workspace that has no spec.
        workspace_id: String,
    },

    /// The requested version does not exist.
    #[error("{code}: version {version} not found for workspace {workspace_id}")]
    VersionNotFound {
        /// The offending error code.
        code: ErrorCode,
        /// The workspace queried.
        workspace_id: String,
        /// The missing version number.
        version: u64,
    },

    /// `initialize` was called on a workspace that already has a spec.
    #[error("{code}: spec already exists for workspace {workspace_id}")]
    SpecAlreadyExists {
        /// The offending error code.
        code: ErrorCode,
        /// The workspace that already has a spec.
        workspace_id: String,
    },

    /// An `add` targeted an array index more than one past the end.
    #[error("{code}: index {index} out of bounds for array of length {len} at {path}")]
    IndexOutOfBounds {
        /// The offending error code.
        code: ErrorCode,
        /// The path of the array.
        path: String,
        /// The index that was requested.
        index: usize,
        /// The array's current length.
        len: usize,
    },

    /// An enum leaf value did not match any canonical or legacy alias.
    #[error("{code}: '{value}' is not a valid {enum_name}")]
    InvalidEnumValue {
        /// The offending error code.
        code: ErrorCode,
        /// Name of the enum type.
        enum_name: String,
        /// The value that failed to parse.
        value: String,
    },

    /// Two or more elements derived the same registry id.
    #[error("{code}: duplicate registry id '{registry_id}'")]
    DuplicateRegistryId {
        /// The offending error code.
        code: ErrorCode,
        /// The id that collided.
        registry_id: String,
    },

    /// A required field could not be derived.
    #[error("{code}: missing required field '{field}': {reason}")]
    MissingRequiredField {
        /// The offending error code.
        code: ErrorCode,
        /// The field that could not be derived.
        field: String,
        /// Why derivation failed.
        reason: String,
    },

    /// A recipe references an element absent from the IR.
    #[error("{code}: recipe '{recipe_id}' references unknown element '{reference}'")]
    DanglingRecipeReference {
        /// The offending error code.
        code: ErrorCode,
        /// The recipe with the dangling reference.
        recipe_id: String,
        /// The missing element id.
        reference: String,
    },

    /// No tool handler registered for a task kind.
    #[error("{code}: no tool handler registered for task kind '{kind}'")]
    UnknownTaskKind {
        /// The offending error code.
        code: ErrorCode,
        /// The unregistered task kind.
        kind: String,
    },

    /// A declared-required parameter was missing.
    #[error("{code}: task {task_id} missing required parameter '{parameter}'")]
    MissingParameter {
        /// The offending error code.
        code: ErrorCode,
        /// The task that is missing the parameter.
        task_id: String,
        /// The missing parameter's name.
        parameter: String,
    },

    /// A tool handler reported failure.
    #[error("{code}: tool failure in task {task_id}: {reason}")]
    ToolFailure {
        /// The offending error code.
        code: ErrorCode,
        /// The task that failed.
        task_id: String,
        /// The handler-reported failure reason.
        reason: String,
    },

    /// A task exceeded its timeout.
    #[error("{code}: task {task_id} timed out after {elapsed_ms}ms")]
    Timeout {
        /// The offending error code.
        code: ErrorCode,
        /// The task that timed out.
        task_id: String,
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// The DAG could not make progress: no ready tasks but some remain pending.
    #[error("{code}: execution deadlocked with {pending} pending task(s) and none ready")]
    ExecutionDeadlock {
        /// The offending error code.
        code: ErrorCode,
        /// Number of tasks still pending.
        pending: usize,
    },

    /// A new run was triggered while the workspace already has a non-terminal run.
    #[error("{code}: workspace {workspace_id} already has a run in progress ({existing_run_id})")]
    RunInProgress {
        /// The offending error code.
        code: ErrorCode,
        /// The workspace with a conflicting run.
        workspace_id: String,
        /// The run already in progress.
        existing_run_id: uuid::Uuid,
    },

    /// The requested run does not exist.
    #[error("{code}: run {run_id} not found")]
    RunNotFound {
        /// The offending error code.
        code: ErrorCode,
        /// The missing run id.
        run_id: uuid::Uuid,
    },

    /// The requested state transition is not permitted.
    #[error("{code}: cannot transition run {run_id} from {from} via {action}")]
    InvalidTransition {
        /// The offending error code.
        code: ErrorCode,
        /// The run being transitioned.
        run_id: uuid::Uuid,
        /// The state it was in.
        from: String,
        /// The action that was rejected.
        action: String,
    },

    /// An I/O operation failed.
    #[error("{code}: I/O error: {source}")]
    Io {
        /// The offending error code.
        code: ErrorCode,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("{code}: serialization error: {source}")]
    Serialization {
        /// The offending error code.
        code: ErrorCode,
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// An unexpected internal error.
    #[error("{code}: internal error: {message}")]
    Internal {
        /// The offending error code.
        code: ErrorCode,
        /// Human-readable detail.
        message: String,
    },
}

impl ForgeError {
    /// Return this error's [`ErrorCode`].
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PathNotFound { code, .. }
            | Self::PathTypeMismatch { code, .. }
            | Self::NoCurrentSpec { code, .. }
            | Self::VersionNotFound { code, .. }
            | Self::SpecAlreadyExists { code, .. }
            | Self::IndexOutOfBounds { code, .. }
            | Self::InvalidEnumValue { code, .. }
            | Self::DuplicateRegistryId { code, .. }
            | Self::MissingRequiredField { code, .. }
            | Self::DanglingRecipeReference { code, .. }
            | Self::UnknownTaskKind { code, .. }
            | Self::MissingParameter { code, .. }
            | Self::ToolFailure { code, .. }
            | Self::Timeout { code, .. }
            | Self::ExecutionDeadlock { code, .. }
            | Self::RunInProgress { code, .. }
            | Self::RunNotFound { code, .. }
            | Self::InvalidTransition { code, .. }
            | Self::Io { code, .. }
            | Self::Serialization { code, .. }
            | Self::Internal { code, .. } => *code,
        }
    }

    /// Build an [`ErrorCode::Internal`] variant from a display-able message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            code: ErrorCode::IoError,
            source,
        }
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            source,
        }
    }
}
