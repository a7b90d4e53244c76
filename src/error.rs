//! Error types
//!
//! Registry errors are raised at startup and abort the process.
//! Task errors are local to one task and end up as its failure payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the armory registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArmoryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool '{name}': {reason}")]
    InvalidTool { name: String, reason: String },
}

/// Errors that terminate a single task
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Ambiguous command: {0}")]
    AmbiguousCommand(String),

    #[error("No weapon matches weakness '{0}'")]
    NoMatchingTool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Task cancelled")]
    Cancelled,

    #[error("Task store unavailable: {0}")]
    TaskStore(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Registration faults surfacing at invocation time
    #[error("Armory error: {0}")]
    Armory(ArmoryError),
}

impl TaskError {
    /// Failure kind recorded on the task
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AmbiguousCommand(_) => FailureKind::AmbiguousCommand,
            Self::NoMatchingTool(_) => FailureKind::NoMatchingTool,
            Self::UnknownTool(_) => FailureKind::UnknownTool,
            Self::Cancelled => FailureKind::Cancelled,
            Self::TaskStore(_) | Self::TaskNotFound(_) | Self::InvalidTransition { .. } => {
                FailureKind::TaskStore
            }
            Self::Armory(_) => FailureKind::Armory,
        }
    }
}

impl From<ArmoryError> for TaskError {
    fn from(err: ArmoryError) -> Self {
        match err {
            ArmoryError::UnknownTool(name) => Self::UnknownTool(name),
            other => Self::Armory(other),
        }
    }
}

/// Serialized failure reason of a terminal task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    #[serde(rename = "AmbiguousCommandError")]
    AmbiguousCommand,
    #[serde(rename = "NoMatchingToolError")]
    NoMatchingTool,
    #[serde(rename = "UnknownToolError")]
    UnknownTool,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "TaskStoreError")]
    TaskStore,
    #[serde(rename = "ArmoryError")]
    Armory,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmbiguousCommand => "AmbiguousCommandError",
            Self::NoMatchingTool => "NoMatchingToolError",
            Self::UnknownTool => "UnknownToolError",
            Self::Cancelled => "Cancelled",
            Self::TaskStore => "TaskStoreError",
            Self::Armory => "ArmoryError",
        }
    }
}
